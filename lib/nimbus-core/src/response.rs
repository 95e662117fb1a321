//! Responses as handed back by a transport.
//!
//! Resource answers are JSON documents wrapped under a root key;
//! [`Response::json_at`] unwraps and decodes them in one step:
//!
//! ```ignore
//! let vpc: Vpc = response.json_at("vpc")?;
//! ```

use std::collections::HashMap;

use bytes::Bytes;
use serde::de::DeserializeOwned;

/// HTTP response with status, headers, and body.
#[derive(Debug, Clone)]
pub struct Response<B = Bytes> {
    status: u16,
    headers: HashMap<String, String>,
    body: B,
}

impl<B> Response<B> {
    /// Creates a new response.
    #[must_use]
    pub fn new(status: u16, headers: HashMap<String, String>, body: B) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// HTTP status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Single header value by name, ignoring ASCII case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Response body.
    #[must_use]
    pub const fn body(&self) -> &B {
        &self.body
    }

    /// Consume into body.
    #[must_use]
    pub fn into_body(self) -> B {
        self.body
    }

    /// Consume into (status, headers, body).
    #[must_use]
    pub fn into_parts(self) -> (u16, HashMap<String, String>, B) {
        (self.status, self.headers, self.body)
    }

    /// Status is 2xx.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Status is 4xx.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.status >= 400 && self.status < 500
    }

    /// Status is 5xx.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        self.status >= 500 && self.status < 600
    }
}

impl Response<Bytes> {
    /// Deserialize the whole body as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn json<T: DeserializeOwned>(&self) -> crate::Result<T> {
        crate::from_json(&self.body)
    }

    /// Deserialize the object found under a root key.
    ///
    /// Single-resource answers are wrapped (`{"vpc": {...}}`); this unwraps
    /// and decodes in one step. A missing key decodes as `null`, so the
    /// caller's type decides whether that is acceptable.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is not JSON or the value does not decode.
    pub fn json_at<T: DeserializeOwned>(&self, key: &str) -> crate::Result<T> {
        let mut value: serde_json::Value = self.json()?;
        let inner = value
            .get_mut(key)
            .map(serde_json::Value::take)
            .unwrap_or_default();
        crate::from_value(inner, key)
    }
}
