//! Fetched pages and the strategies that interpret them.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::{Error, Response, Result};

/// The raw outcome of one page request.
#[derive(Debug, Clone)]
pub struct PageResult {
    url: Url,
    status: u16,
    headers: HashMap<String, String>,
    body: Value,
}

impl PageResult {
    /// Decode a response fetched from `url`. An empty body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-empty body is not JSON.
    pub fn from_response(url: Url, response: Response) -> Result<Self> {
        let (status, headers, bytes) = response.into_parts();
        let body = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            crate::from_json(&bytes)?
        };
        Ok(Self {
            url,
            status,
            headers,
            body,
        })
    }

    /// A result built from parts, for tests and custom page sources.
    #[must_use]
    pub fn new(url: Url, status: u16, body: Value) -> Self {
        Self {
            url,
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// URL the page was fetched from.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status of the page response.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Decoded JSON body.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Decode the array under `key`. A missing or `null` key yields no items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] with the path under `key`.
    pub fn items<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        match self.body.get(key) {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(items) => crate::from_value(items.clone(), key),
        }
    }

    fn collection(&self, key: &str) -> Result<&[Value]> {
        match self.body.get(key) {
            None | Some(Value::Null) => Ok(&[]),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(Error::json_deserialization(key, "expected an array")),
        }
    }
}

/// How the next page is found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Strategy {
    /// The collection fits in one response.
    Single,
    /// The body carries `[{rel, href}]` links under `links_key`.
    Linked {
        /// Body key holding the links array.
        links_key: String,
    },
    /// The next page starts after the last item's identifier.
    Marker {
        /// Query parameter carrying the marker.
        marker_param: String,
        /// Item key holding the identifier.
        id_key: String,
    },
}

impl Strategy {
    /// Exactly one page.
    #[must_use]
    pub const fn single() -> Self {
        Self::Single
    }

    /// Follow the `next` link found under `links_key`.
    ///
    /// The key is collection specific (`vpcs_links`, `servers_links`, ...)
    /// and nothing checks it against the response: a wrong key reads as
    /// "no next link" and traversal stops after the first page.
    #[must_use]
    pub fn linked(links_key: impl Into<String>) -> Self {
        Self::Linked {
            links_key: links_key.into(),
        }
    }

    /// Marker pagination with the usual `marker` parameter and `id` key.
    #[must_use]
    pub fn marker() -> Self {
        Self::marker_with("marker", "id")
    }

    /// Marker pagination with custom parameter and identifier key.
    #[must_use]
    pub fn marker_with(marker_param: impl Into<String>, id_key: impl Into<String>) -> Self {
        Self::Marker {
            marker_param: marker_param.into(),
            id_key: id_key.into(),
        }
    }

    /// Wrap a fetched result in the page kind for this strategy.
    #[must_use]
    pub fn page(&self, result: PageResult, collection: &str) -> Page {
        let collection = collection.to_string();
        match self {
            Self::Single => Page::Single(SinglePage { result, collection }),
            Self::Linked { links_key } => Page::Linked(LinkedPage {
                result,
                collection,
                links_key: links_key.clone(),
            }),
            Self::Marker {
                marker_param,
                id_key,
            } => Page::Marker(MarkerPage {
                result,
                collection,
                marker_param: marker_param.clone(),
                id_key: id_key.clone(),
            }),
        }
    }
}

/// A page with no continuation.
#[derive(Debug, Clone)]
pub struct SinglePage {
    result: PageResult,
    collection: String,
}

/// A page continued by a `next` link.
#[derive(Debug, Clone)]
pub struct LinkedPage {
    result: PageResult,
    collection: String,
    links_key: String,
}

impl LinkedPage {
    fn next_url(&self) -> Result<Option<Url>> {
        let links = match self.result.body.get(&self.links_key) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Array(links)) => links,
            Some(_) => {
                return Err(Error::malformed_continuation(format!(
                    "`{}` is not an array",
                    self.links_key
                )));
            }
        };

        for link in links {
            if link.get("rel").and_then(Value::as_str) != Some("next") {
                continue;
            }
            let href = link.get("href").and_then(Value::as_str).ok_or_else(|| {
                Error::malformed_continuation(format!("next link without `href` in `{}`", self.links_key))
            })?;
            if href.is_empty() {
                return Ok(None);
            }
            return self
                .result
                .url
                .join(href)
                .map(Some)
                .map_err(|err| Error::malformed_continuation(format!("next link `{href}`: {err}")));
        }
        Ok(None)
    }
}

/// A page continued from its last item's identifier.
#[derive(Debug, Clone)]
pub struct MarkerPage {
    result: PageResult,
    collection: String,
    marker_param: String,
    id_key: String,
}

impl MarkerPage {
    fn next_url(&self) -> Result<Option<Url>> {
        let Some(last) = self.result.collection(&self.collection)?.last() else {
            return Ok(None);
        };
        let marker = match last.get(&self.id_key) {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                return Err(Error::malformed_continuation(format!(
                    "last `{}` item has no usable `{}`",
                    self.collection, self.id_key
                )));
            }
        };

        let mut url = self.result.url.clone();
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| *key != self.marker_param)
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();
        url.query_pairs_mut()
            .clear()
            .extend_pairs(kept)
            .append_pair(&self.marker_param, &marker);
        Ok(Some(url))
    }
}

/// One fetched page of a collection.
#[derive(Debug, Clone)]
pub enum Page {
    /// See [`Strategy::Single`].
    Single(SinglePage),
    /// See [`Strategy::Linked`].
    Linked(LinkedPage),
    /// See [`Strategy::Marker`].
    Marker(MarkerPage),
}

impl Page {
    /// The fetched result.
    #[must_use]
    pub fn result(&self) -> &PageResult {
        match self {
            Self::Single(page) => &page.result,
            Self::Linked(page) => &page.result,
            Self::Marker(page) => &page.result,
        }
    }

    fn collection(&self) -> &str {
        match self {
            Self::Single(page) => &page.collection,
            Self::Linked(page) => &page.collection,
            Self::Marker(page) => &page.collection,
        }
    }

    /// Returns `true` if the collection is absent, `null` or an empty array.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] if the collection is not an array.
    pub fn is_empty(&self) -> Result<bool> {
        self.result()
            .collection(self.collection())
            .map(<[Value]>::is_empty)
    }

    /// URL of the following page, or `None` when this is the last one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedContinuation`] if the continuation data is unusable.
    pub fn next_url(&self) -> Result<Option<Url>> {
        match self {
            Self::Single(_) => Ok(None),
            Self::Linked(page) => page.next_url(),
            Self::Marker(page) => page.next_url(),
        }
    }

    /// Decode this page's items.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonDeserialization`] if an item does not decode.
    pub fn items<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.result().items(self.collection())
    }
}
