//! Tower middleware over nimbus requests.
//!
//! Every layer here works on [`crate::Request`]/[`crate::Response`] and plugs
//! into [`crate::HyperClientBuilder::layer`]; the builder's `with_*` helpers
//! are shortcuts for the common ones.
//!
//! - [`AuthTokenLayer`] adds the `X-Auth-Token` header
//! - [`LoggingLayer`] records each exchange with `tracing`
//! - [`RetryPolicy`] drives tower's [`RetryLayer`] for idempotent requests
//!
//! ```ignore
//! use nimbus::HyperClient;
//! use nimbus::middleware::{ConcurrencyLimitLayer, LoggingLayer};
//!
//! let client = HyperClient::builder()
//!     .layer(ConcurrencyLimitLayer::new(8))
//!     .layer(LoggingLayer::debug())
//!     .build();
//! ```

mod auth_token;
mod logging;
mod retry;

pub use auth_token::{AUTH_TOKEN_HEADER, AuthToken, AuthTokenLayer};
pub use logging::{LogLevel, Logging, LoggingLayer};
pub use retry::RetryPolicy;

pub use tower::limit::ConcurrencyLimitLayer;
pub use tower::retry::RetryLayer;
pub use tower::{Layer, ServiceBuilder};
