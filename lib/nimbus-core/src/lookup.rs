//! Resolving resource names to identifiers.

use std::collections::HashMap;

use crate::{Error, HttpClient, Pager, Result};

/// Resolves a resource name to its identifier.
///
/// Body builders call this for fields declared with `lookup(...)`, once the
/// field is set and the identifier was not given directly.
pub trait IdLookup: Send + Sync {
    /// The identifier of the single `kind` resource called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFoundLookup`] when no resource matches, or
    /// [`Error::AmbiguousLookup`] when several do.
    fn resolve(&self, kind: &str, name: &str) -> Result<String>;
}

impl<T: IdLookup + ?Sized> IdLookup for &T {
    fn resolve(&self, kind: &str, name: &str) -> Result<String> {
        (**self).resolve(kind, name)
    }
}

/// Pick the identifier out of every id matching one name.
///
/// # Errors
///
/// Returns [`Error::NotFoundLookup`] for no match, [`Error::AmbiguousLookup`] for several.
pub fn single_match(kind: &str, name: &str, ids: &[String]) -> Result<String> {
    match ids {
        [id] => Ok(id.clone()),
        [] => Err(Error::not_found_lookup(kind, name)),
        _ => Err(Error::ambiguous_lookup(kind, name, ids.len())),
    }
}

/// An in-memory name table, keyed by kind and name.
///
/// # Example
///
/// ```
/// use nimbus_core::{IdLookup, NameTable};
///
/// let table = NameTable::new()
///     .with("flavor", "m1.small", "f-1")
///     .with("image", "cirros", "i-1");
///
/// assert_eq!(table.resolve("flavor", "m1.small").unwrap(), "f-1");
/// assert!(table.resolve("image", "ubuntu").is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    entries: HashMap<(String, String), Vec<String>>,
}

#[derive(serde::Deserialize)]
struct Named {
    id: String,
    #[serde(default)]
    name: String,
}

impl NameTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that the `kind` resource `name` has identifier `id`.
    ///
    /// Names are not unique: inserting the same name twice makes it ambiguous.
    pub fn insert(&mut self, kind: impl Into<String>, name: impl Into<String>, id: impl Into<String>) {
        self.entries
            .entry((kind.into(), name.into()))
            .or_default()
            .push(id.into());
    }

    /// Builder form of [`NameTable::insert`].
    #[must_use]
    pub fn with(mut self, kind: impl Into<String>, name: impl Into<String>, id: impl Into<String>) -> Self {
        self.insert(kind, name, id);
        self
    }

    /// Lists a whole collection of `{id, name}` items and records them under `kind`.
    ///
    /// # Errors
    ///
    /// Returns the first traversal or decode error.
    pub async fn from_pager<C: HttpClient>(kind: &str, pager: &Pager<C>) -> Result<Self> {
        let items: Vec<Named> = pager.all_items().await?;
        tracing::debug!(kind, count = items.len(), "loaded name table");
        let mut table = Self::new();
        for item in items {
            table.insert(kind, item.name, item.id);
        }
        Ok(table)
    }

    /// Adds every entry of `other`.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (key, ids) in other.entries {
            self.entries.entry(key).or_default().extend(ids);
        }
        self
    }
}

impl IdLookup for NameTable {
    fn resolve(&self, kind: &str, name: &str) -> Result<String> {
        let ids = self
            .entries
            .get(&(kind.to_string(), name.to_string()))
            .map_or(&[][..], Vec::as_slice);
        single_match(kind, name, ids)
    }
}
