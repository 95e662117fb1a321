//! Request body building from option structs.
//!
//! Bodies are JSON objects, usually wrapped under a single root key
//! (`{"vpc": {...}}`). The builder applies the same omission and required
//! rules as the query builder, plus:
//!
//! - byte content is base64 encoded, unless it already is valid base64 text;
//! - `Some("")` on an optional string becomes an explicit `null`;
//! - lookup fields are resolved to identifiers once every other field is written.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Map, Value};

use crate::{Described, Error, FieldTarget, FieldValue, Fields, IdLookup, Result};

/// A JSON request body.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Body(Map<String, Value>);

impl Body {
    /// An empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Value under a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Inserts a top-level key, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes a top-level key.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    /// Returns `true` if the body has no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Wraps the whole body under `root`. An empty root leaves it as is.
    #[must_use]
    pub fn wrap(self, root: &str) -> Self {
        if root.is_empty() {
            return self;
        }
        let mut wrapped = Map::new();
        wrapped.insert(root.to_string(), Value::Object(self.0));
        Self(wrapped)
    }

    /// The object under `root`, or the top level when `root` is empty.
    pub fn root_mut(&mut self, root: &str) -> Option<&mut Map<String, Value>> {
        if root.is_empty() {
            return Some(&mut self.0);
        }
        self.0.get_mut(root).and_then(Value::as_object_mut)
    }

    /// The underlying map.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for Body {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Body> for Value {
    fn from(body: Body) -> Self {
        body.into_value()
    }
}

/// Option structs that serialize to a request body.
///
/// Generated by `#[derive(Options)]` for structs with a `root`; written by
/// hand when a body merges several parts. [`crate::Extended`] implements it
/// by wrapping another `ToBody`.
pub trait ToBody {
    /// Build the body, resolving lookup fields through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for missing required fields, a lookup
    /// error when a name cannot be resolved, or
    /// [`Error::NoLookupCapability`] when a lookup field is set and `lookup`
    /// is `None`.
    fn to_body_with(&self, lookup: Option<&dyn IdLookup>) -> Result<Body>;

    /// Build the body without a lookup collaborator.
    ///
    /// # Errors
    ///
    /// See [`ToBody::to_body_with`].
    fn to_body(&self) -> Result<Body> {
        self.to_body_with(None)
    }
}

impl<T: ToBody + ?Sized> ToBody for &T {
    fn to_body_with(&self, lookup: Option<&dyn IdLookup>) -> Result<Body> {
        (**self).to_body_with(lookup)
    }
}

#[derive(Debug)]
struct PendingLookup {
    field: &'static str,
    key: &'static str,
    kind: &'static str,
    name: String,
}

/// Accumulates body fields and the lookups they request.
#[derive(Debug, Default)]
pub struct BodyWriter {
    map: Map<String, Value>,
    lookups: Vec<PendingLookup>,
}

impl BodyWriter {
    fn finish(mut self, lookup: Option<&dyn IdLookup>) -> Result<Body> {
        for pending in self.lookups {
            if self
                .map
                .get(pending.key)
                .is_some_and(|given| given.as_str() != Some(""))
            {
                tracing::trace!(
                    field = pending.field,
                    key = pending.key,
                    "identifier given directly, skipping lookup"
                );
                continue;
            }
            let lookup = lookup.ok_or(Error::NoLookupCapability {
                field: pending.field,
            })?;
            let id = lookup.resolve(pending.kind, &pending.name)?;
            self.map.insert(pending.key.to_string(), Value::String(id));
        }
        Ok(Body(self.map))
    }
}

/// Build a body under `root` with no lookup collaborator.
///
/// # Errors
///
/// See [`build_body_with`].
pub fn build_body<T: Described>(options: &T, root: &str) -> Result<Body> {
    build_body_with(options, root, None)
}

/// Build a body from an option struct's body fields.
///
/// The result is `{root: {...}}`, or the bare field map when `root` is empty.
///
/// # Errors
///
/// Returns [`Error::MissingRequiredField`] for a zero required field,
/// [`Error::NoLookupCapability`] for a set lookup field without `lookup`, or
/// whatever error the lookup reports.
pub fn build_body_with<T: Described>(
    options: &T,
    root: &str,
    lookup: Option<&dyn IdLookup>,
) -> Result<Body> {
    let mut writer = BodyWriter::default();
    options.write_body(&mut writer)?;
    Ok(writer.finish(lookup)?.wrap(root))
}

pub(crate) fn write_fields<T: Described>(options: &T, out: &mut BodyWriter) -> Result<()> {
    for field in T::FIELDS {
        let value = (field.value)(options);
        match field.target {
            FieldTarget::Embedded => {
                if let FieldValue::Embedded(parent) = value {
                    parent.write_body(out)?;
                }
            }
            FieldTarget::Body(key) => {
                if value.is_zero() {
                    if field.required {
                        return Err(Error::MissingRequiredField { field: field.name });
                    }
                    if field.omittable {
                        continue;
                    }
                }
                if let Some(json) = to_json_value(&value) {
                    out.map.insert(key.to_string(), json);
                }
            }
            FieldTarget::Ignore => {
                if value.is_zero() {
                    if field.required {
                        return Err(Error::MissingRequiredField { field: field.name });
                    }
                    continue;
                }
                if let Some(spec) = field.lookup
                    && let Some(name) = value.scalar_text()
                {
                    out.lookups.push(PendingLookup {
                        field: field.name,
                        key: spec.key,
                        kind: spec.kind,
                        name,
                    });
                }
            }
            FieldTarget::Query(_) => {}
        }
    }
    Ok(())
}

fn to_json_value(value: &FieldValue<'_>) -> Option<Value> {
    let json = match value {
        FieldValue::Str(s) => Value::String((*s).to_string()),
        FieldValue::Bool(b) => Value::Bool(*b),
        FieldValue::Int(n) => Value::from(*n),
        FieldValue::UInt(n) => Value::from(*n),
        FieldValue::Float(n) => Value::from(*n),
        FieldValue::Bytes(b) => Value::String(encode_content(b)),
        FieldValue::List(items) => Value::Array(items.iter().filter_map(to_json_value).collect()),
        FieldValue::Map(entries) => Value::Object(
            entries
                .iter()
                .filter_map(|(key, value)| to_json_value(value).map(|v| ((*key).to_string(), v)))
                .collect(),
        ),
        FieldValue::Json(value) => (*value).clone(),
        FieldValue::Set(inner) => match inner.as_ref() {
            FieldValue::Str("") => Value::Null,
            other => to_json_value(other)?,
        },
        FieldValue::Unset | FieldValue::Embedded(_) => return None,
    };
    Some(json)
}

/// Base64 encode byte content for a request body.
///
/// Content that already is valid standard base64 text is returned as is, so
/// callers may pass either raw or pre-encoded payloads.
#[must_use]
pub fn encode_content(content: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(content)
        && !text.is_empty()
        && STANDARD.decode(text).is_ok()
    {
        return text.to_string();
    }
    STANDARD.encode(content)
}
