//! Query string building from option structs.
//!
//! # Example
//!
//! ```ignore
//! #[derive(Options)]
//! struct ListOpts {
//!     #[opts(query)]
//!     name: String,
//!     #[opts(query = "limit")]
//!     limit: u32,
//! }
//!
//! let query = ListOpts { name: "web".into(), limit: 0 }.to_query()?;
//! assert_eq!(query.to_string(), "?name=web");
//! ```

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

use crate::{CollectionFormat, Described, Error, FieldTarget, FieldValue, Fields, Result};

/// Everything but the RFC 3986 unreserved characters.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// An ordered list of query pairs.
///
/// Displays as `?k=v&...`, or as an empty string when there are no pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryString {
    pairs: Vec<(String, String)>,
}

impl QueryString {
    /// An empty query.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A query built from raw (unencoded) pairs.
    #[must_use]
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Appends a raw (unencoded) pair.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Raw pairs in insertion order.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Returns `true` if there are no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The percent-encoded `k=v&...` text, without the leading `?`.
    #[must_use]
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (index, (key, value)) in self.pairs.iter().enumerate() {
            if index > 0 {
                out.push('&');
            }
            out.extend(utf8_percent_encode(key, QUERY_ENCODE_SET));
            out.push('=');
            out.extend(utf8_percent_encode(value, QUERY_ENCODE_SET));
        }
        out
    }

    /// Returns `url` with these pairs appended to whatever query it already has.
    #[must_use]
    pub fn with_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        if self.is_empty() {
            return url;
        }
        let encoded = self.encode();
        let query = match url.query() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{encoded}"),
            _ => encoded,
        };
        url.set_query(Some(&query));
        url
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "?{}", self.encode())
    }
}

/// Option structs that serialize to a query string.
///
/// Generated by `#[derive(Options)]` when any field targets the query.
pub trait ToQuery {
    /// Build the query string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredField`] if a required field is zero.
    fn to_query(&self) -> Result<QueryString>;
}

impl<T: ToQuery + ?Sized> ToQuery for &T {
    fn to_query(&self) -> Result<QueryString> {
        (**self).to_query()
    }
}

/// Build a query string from an option struct's query fields.
///
/// Fields are visited in declaration order. Zero-valued fields are skipped
/// unless required, in which case the whole build fails.
///
/// # Errors
///
/// Returns [`Error::MissingRequiredField`] if a required field is zero.
pub fn build_query<T: Described>(options: &T) -> Result<QueryString> {
    let mut query = QueryString::new();
    options.write_query(&mut query)?;
    Ok(query)
}

pub(crate) fn write_fields<T: Described>(options: &T, out: &mut QueryString) -> Result<()> {
    for field in T::FIELDS {
        let value = (field.value)(options);
        match field.target {
            FieldTarget::Embedded => {
                if let FieldValue::Embedded(parent) = value {
                    parent.write_query(out)?;
                }
            }
            FieldTarget::Query(key) => {
                if value.is_zero() {
                    if field.required {
                        return Err(Error::MissingRequiredField { field: field.name });
                    }
                    if field.omittable {
                        tracing::trace!(field = field.name, "skipping zero query field");
                        continue;
                    }
                }
                push_value(out, key, &value, field.format);
            }
            FieldTarget::Body(_) | FieldTarget::Ignore => {}
        }
    }
    Ok(())
}

fn push_value(out: &mut QueryString, key: &str, value: &FieldValue<'_>, format: CollectionFormat) {
    match value {
        FieldValue::Set(inner) => push_value(out, key, inner, format),
        FieldValue::List(items) => {
            let rendered = items.iter().filter_map(FieldValue::scalar_text);
            match format {
                CollectionFormat::Multi => {
                    for item in rendered {
                        out.push(key, item);
                    }
                }
                CollectionFormat::Csv => {
                    out.push(key, rendered.collect::<Vec<_>>().join(","));
                }
            }
        }
        FieldValue::Map(entries) => {
            let rendered: Vec<String> = entries
                .iter()
                .filter_map(|(name, value)| {
                    value.scalar_text().map(|text| format!("'{name}':'{text}'"))
                })
                .collect();
            out.push(key, format!("{{{}}}", rendered.join(", ")));
        }
        FieldValue::Unset | FieldValue::Embedded(_) => {}
        scalar => {
            if let Some(text) = scalar.scalar_text() {
                out.push(key, text);
            }
        }
    }
}
