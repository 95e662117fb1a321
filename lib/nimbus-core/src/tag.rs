//! Field descriptors for option structs.
//!
//! Every option struct carries a static table of [`FieldDescriptor`]s (usually
//! generated by `#[derive(Options)]`). The query and body builders walk that
//! table in declaration order; they never inspect the struct any other way.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use bytes::Bytes;

use crate::{BodyWriter, QueryString, Result};

/// Where a field is serialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTarget {
    /// Emitted in query strings under this key.
    Query(&'static str),
    /// Emitted in request bodies under this key.
    Body(&'static str),
    /// Never serialized. Still subject to `required` checks and lookups.
    Ignore,
    /// Parent options whose own fields are written in place.
    Embedded,
}

/// How a sequence is rendered in a query string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CollectionFormat {
    /// One `key=value` pair per element.
    #[default]
    Multi,
    /// A single pair with comma-joined elements.
    Csv,
}

/// A name that is resolved to an identifier while building a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookupSpec {
    /// Body key receiving the resolved identifier.
    pub key: &'static str,
    /// Resource kind handed to [`crate::IdLookup::resolve`].
    pub kind: &'static str,
}

/// Static description of one field of an option struct.
pub struct FieldDescriptor<T> {
    /// Logical field name, used in error messages.
    pub name: &'static str,
    /// Serialization target.
    pub target: FieldTarget,
    /// Fail the build when the value is zero.
    pub required: bool,
    /// Leave the field out when the value is zero.
    pub omittable: bool,
    /// Sequence policy for query strings.
    pub format: CollectionFormat,
    /// Name-to-identifier resolution, for `Ignore` fields.
    pub lookup: Option<LookupSpec>,
    /// Reads the field out of an instance.
    pub value: fn(&T) -> FieldValue<'_>,
}

impl<T> FieldDescriptor<T> {
    /// An optional field with the default collection format.
    #[must_use]
    pub const fn new(name: &'static str, target: FieldTarget, value: fn(&T) -> FieldValue<'_>) -> Self {
        Self {
            name,
            target,
            required: false,
            omittable: true,
            format: CollectionFormat::Multi,
            lookup: None,
            value,
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Emits the field even when its value is zero. `None` stays absent.
    #[must_use]
    pub const fn keep_zero(mut self) -> Self {
        self.omittable = false;
        self
    }

    /// Sets the query collection format.
    #[must_use]
    pub const fn format(mut self, format: CollectionFormat) -> Self {
        self.format = format;
        self
    }

    /// Resolves the field's value as a `kind` name and writes the id under `key`.
    #[must_use]
    pub const fn lookup(mut self, key: &'static str, kind: &'static str) -> Self {
        self.lookup = Some(LookupSpec { key, kind });
        self
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("required", &self.required)
            .field("omittable", &self.omittable)
            .field("format", &self.format)
            .field("lookup", &self.lookup)
            .finish_non_exhaustive()
    }
}

/// Option structs with a static field table.
///
/// Implemented by `#[derive(Options)]`; hand-written tables work the same way.
pub trait Described: Sized + 'static {
    /// Fields in declaration order.
    const FIELDS: &'static [FieldDescriptor<Self>];
}

/// A borrowed view of one field's value.
pub enum FieldValue<'a> {
    /// Text.
    Str(&'a str),
    /// Boolean.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    UInt(u64),
    /// Floating point number.
    Float(f64),
    /// Byte content, base64 encoded in bodies.
    Bytes(&'a [u8]),
    /// A sequence.
    List(Vec<FieldValue<'a>>),
    /// String-keyed entries, sorted by key.
    Map(Vec<(&'a str, FieldValue<'a>)>),
    /// An arbitrary JSON document.
    Json(&'a serde_json::Value),
    /// An explicitly set optional (`Some`), emitted even when the inner value is zero.
    Set(Box<FieldValue<'a>>),
    /// An optional that was not set (`None`).
    Unset,
    /// Parent options flattened into the current level.
    Embedded(&'a dyn Fields),
}

impl FieldValue<'_> {
    /// Returns `true` for the zero value of the field's type.
    ///
    /// An explicitly set optional is never zero, whatever it holds.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Str(s) => s.is_empty(),
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::UInt(n) => *n == 0,
            Self::Float(n) => *n == 0.0,
            Self::Bytes(b) => b.is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Json(value) => match value {
                serde_json::Value::Null => true,
                serde_json::Value::Array(items) => items.is_empty(),
                serde_json::Value::Object(map) => map.is_empty(),
                _ => false,
            },
            Self::Unset => true,
            Self::Set(_) | Self::Embedded(_) => false,
        }
    }

    /// Scalar text rendering used for query values and lookup names.
    pub(crate) fn scalar_text(&self) -> Option<String> {
        match self {
            Self::Str(s) => Some((*s).to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(n) => Some(n.to_string()),
            Self::UInt(n) => Some(n.to_string()),
            Self::Float(n) => Some(n.to_string()),
            Self::Bytes(b) => Some(crate::encode_content(b)),
            Self::Json(serde_json::Value::String(s)) => Some(s.clone()),
            Self::Json(value) => Some(value.to_string()),
            Self::Set(inner) => inner.scalar_text(),
            Self::List(_) | Self::Map(_) | Self::Unset | Self::Embedded(_) => None,
        }
    }
}

impl fmt::Debug for FieldValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Int(n) => f.debug_tuple("Int").field(n).finish(),
            Self::UInt(n) => f.debug_tuple("UInt").field(n).finish(),
            Self::Float(n) => f.debug_tuple("Float").field(n).finish(),
            Self::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
            Self::Map(entries) => f.debug_tuple("Map").field(entries).finish(),
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Set(inner) => f.debug_tuple("Set").field(inner).finish(),
            Self::Unset => f.write_str("Unset"),
            Self::Embedded(_) => f.write_str("Embedded(..)"),
        }
    }
}

/// Types usable as option struct fields.
pub trait AsFieldValue {
    /// Borrow the value for serialization.
    fn as_field_value(&self) -> FieldValue<'_>;
}

impl AsFieldValue for str {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(self)
    }
}

impl AsFieldValue for String {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Str(self)
    }
}

impl AsFieldValue for bool {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Bool(*self)
    }
}

macro_rules! integer_field {
    ($variant:ident($wide:ty): $($t:ty),*) => {
        $(
            impl AsFieldValue for $t {
                fn as_field_value(&self) -> FieldValue<'_> {
                    FieldValue::$variant(<$wide>::from(*self))
                }
            }
        )*
    };
}

integer_field!(Int(i64): i8, i16, i32, i64);
integer_field!(UInt(u64): u16, u32, u64);

impl AsFieldValue for usize {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::UInt(u64::try_from(*self).unwrap_or(u64::MAX))
    }
}

impl AsFieldValue for f32 {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Float(f64::from(*self))
    }
}

impl AsFieldValue for f64 {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Float(*self)
    }
}

impl AsFieldValue for Bytes {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Bytes(self)
    }
}

impl AsFieldValue for serde_json::Value {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Json(self)
    }
}

impl<T: AsFieldValue + ?Sized> AsFieldValue for &T {
    fn as_field_value(&self) -> FieldValue<'_> {
        (**self).as_field_value()
    }
}

impl<T: AsFieldValue> AsFieldValue for Option<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        match self {
            Some(value) => FieldValue::Set(Box::new(value.as_field_value())),
            None => FieldValue::Unset,
        }
    }
}

impl<T: AsFieldValue> AsFieldValue for [T] {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::List(self.iter().map(AsFieldValue::as_field_value).collect())
    }
}

impl<T: AsFieldValue> AsFieldValue for Vec<T> {
    fn as_field_value(&self) -> FieldValue<'_> {
        self.as_slice().as_field_value()
    }
}

impl<V: AsFieldValue> AsFieldValue for BTreeMap<String, V> {
    fn as_field_value(&self) -> FieldValue<'_> {
        FieldValue::Map(
            self.iter()
                .map(|(key, value)| (key.as_str(), value.as_field_value()))
                .collect(),
        )
    }
}

impl<V: AsFieldValue, S> AsFieldValue for HashMap<String, V, S> {
    fn as_field_value(&self) -> FieldValue<'_> {
        let mut entries: Vec<_> = self
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_field_value()))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        FieldValue::Map(entries)
    }
}

/// Object-safe view of an option struct, used for embedded parent options.
///
/// Blanket-implemented for every [`Described`] type.
pub trait Fields {
    /// Append this value's query fields in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingRequiredField`] for a zero required field.
    fn write_query(&self, out: &mut QueryString) -> Result<()>;

    /// Write this value's body fields and queue its lookups.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MissingRequiredField`] for a zero required field.
    fn write_body(&self, out: &mut BodyWriter) -> Result<()>;
}

impl<T: Described> Fields for T {
    fn write_query(&self, out: &mut QueryString) -> Result<()> {
        crate::query::write_fields(self, out)
    }

    fn write_body(&self, out: &mut BodyWriter) -> Result<()> {
        crate::body::write_fields(self, out)
    }
}
