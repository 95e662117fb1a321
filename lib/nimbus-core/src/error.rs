//! Error types for nimbus.

use derive_more::{Display, Error, From};

/// Main error type for nimbus operations.
///
/// Builders, lookups, pagination and the transport all report through this
/// one enum. Nothing in the core retries or swallows an error: every variant
/// reaches the immediate caller unchanged.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The server answered with a status outside the accepted codes.
    #[display("HTTP error {status}: {message}")]
    #[from(skip)]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Response body, if available.
        #[error(not(source))]
        body: Option<bytes::Bytes>,
    },

    /// Network/connection errors.
    #[display("connection error: {_0}")]
    #[from(skip)]
    Connection(#[error(not(source))] String),

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// Invalid request configuration.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "vpcs[1].name").
        path: String,
        /// Error message.
        message: String,
    },

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// A field marked `required` was zero-valued.
    #[display("missing required field `{field}`")]
    #[from(skip)]
    MissingRequiredField {
        /// Logical name of the field.
        #[error(not(source))]
        field: &'static str,
    },

    /// A name resolved to more than one identifier.
    #[display("found {count} {kind} resources named `{name}`")]
    #[from(skip)]
    AmbiguousLookup {
        /// Resource kind (e.g. "flavor").
        kind: String,
        /// The name that was looked up.
        name: String,
        /// Number of matching resources.
        count: usize,
    },

    /// A name resolved to no identifier.
    #[display("no {kind} resource named `{name}`")]
    #[from(skip)]
    NotFoundLookup {
        /// Resource kind (e.g. "image").
        kind: String,
        /// The name that was looked up.
        name: String,
    },

    /// A name-based field was set but no lookup collaborator was supplied.
    #[display("field `{field}` needs a name lookup but none was provided")]
    #[from(skip)]
    NoLookupCapability {
        /// Logical name of the field.
        #[error(not(source))]
        field: &'static str,
    },

    /// A pagination link or marker could not be used to build the next URL.
    #[display("malformed continuation: {_0}")]
    #[from(skip)]
    MalformedContinuation(#[error(not(source))] String),
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an HTTP error from status code and message.
    #[must_use]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: None,
        }
    }

    /// Create an HTTP error with body.
    #[must_use]
    pub fn http_with_body(status: u16, message: impl Into<String>, body: bytes::Bytes) -> Self {
        Self::Http {
            status,
            message: message.into(),
            body: Some(body),
        }
    }

    /// Create a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a malformed continuation error.
    #[must_use]
    pub fn malformed_continuation(message: impl Into<String>) -> Self {
        Self::MalformedContinuation(message.into())
    }

    /// Create a lookup error for a name with no match.
    #[must_use]
    pub fn not_found_lookup(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NotFoundLookup {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create a lookup error for a name with several matches.
    #[must_use]
    pub fn ambiguous_lookup(kind: impl Into<String>, name: impl Into<String>, count: usize) -> Self {
        Self::AmbiguousLookup {
            kind: kind.into(),
            name: name.into(),
            count,
        }
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if this is a connection error.
    #[must_use]
    pub const fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_))
    }

    /// Returns `true` if a builder rejected the options before any request was sent.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::MissingRequiredField { .. } | Self::NoLookupCapability { .. }
        )
    }

    /// Returns `true` if a name-to-identifier resolution failed.
    #[must_use]
    pub const fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousLookup { .. } | Self::NotFoundLookup { .. }
        )
    }

    /// Returns the HTTP status code if this is an HTTP error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if this is a client error (4xx).
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        self.status().is_some_and(|s| (400..500).contains(&s))
    }

    /// Returns `true` if this is a server error (5xx).
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status().is_some_and(|s| (500..600).contains(&s))
    }

    /// Returns `true` if this is a 404 Not Found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns the response body if this is an HTTP error with a body.
    #[must_use]
    pub fn body(&self) -> Option<&bytes::Bytes> {
        match self {
            Self::Http { body, .. } => body.as_ref(),
            _ => None,
        }
    }

    /// Try to decode the HTTP error body as JSON.
    ///
    /// Most services answer failures with a `{"<kind>": {"message": ...}}`
    /// document; decode it into whatever shape the caller expects.
    pub fn decode_body<T: serde::de::DeserializeOwned>(&self) -> Option<Result<T>> {
        self.body().map(|body| crate::from_json(body))
    }
}
