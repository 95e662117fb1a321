//! Retry policy for transient failures.

use std::future;

use bytes::Bytes;
use tower::retry::Policy;

use crate::{Error, Request, Response};

/// Retries idempotent requests after a transient failure.
///
/// A request is retried when its method is idempotent and it ended with a
/// connection error, a timeout, a 5xx status or 429. `POST` and `PATCH` are
/// never replayed: a lost response may hide a resource that was created.
///
/// ```ignore
/// use nimbus::middleware::{RetryLayer, RetryPolicy};
///
/// let client = HyperClient::builder()
///     .layer(RetryLayer::new(RetryPolicy::new(3)))
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    remaining: u32,
}

impl RetryPolicy {
    /// Allow up to `max_retries` extra attempts per request.
    #[must_use]
    pub const fn new(max_retries: u32) -> Self {
        Self {
            remaining: max_retries,
        }
    }

    /// Attempts left.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    fn is_transient(result: &Result<Response<Bytes>, Error>) -> bool {
        match result {
            Ok(response) => response.status() >= 500 || response.status() == 429,
            Err(error) => error.is_connection() || error.is_timeout(),
        }
    }
}

impl Policy<Request<Bytes>, Response<Bytes>, Error> for RetryPolicy {
    type Future = future::Ready<()>;

    fn retry(
        &mut self,
        request: &mut Request<Bytes>,
        result: &mut Result<Response<Bytes>, Error>,
    ) -> Option<Self::Future> {
        if self.remaining == 0
            || !request.method().is_idempotent()
            || !Self::is_transient(result)
        {
            return None;
        }
        self.remaining -= 1;
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            remaining = self.remaining,
            "retrying request"
        );
        Some(future::ready(()))
    }

    fn clone_request(&mut self, request: &Request<Bytes>) -> Option<Request<Bytes>> {
        request.method().is_idempotent().then(|| request.clone())
    }
}
