//! Token authentication through the `X-Auth-Token` header.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use tower::{Layer, Service};

use crate::{Error, Request, Response, Result};

/// Header carrying the scoped token.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// Layer adding `X-Auth-Token` to requests that do not carry one yet.
///
/// The token is never logged: [`Debug`] prints it redacted.
#[derive(Clone)]
pub struct AuthTokenLayer {
    token: Arc<str>,
}

impl std::fmt::Debug for AuthTokenLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokenLayer")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl AuthTokenLayer {
    /// Authenticate with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: Arc::from(token.into()),
        }
    }
}

impl<S> Layer<S> for AuthTokenLayer {
    type Service = AuthToken<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthToken {
            inner,
            token: Arc::clone(&self.token),
        }
    }
}

/// Service produced by [`AuthTokenLayer`].
#[derive(Clone)]
pub struct AuthToken<S> {
    inner: S,
    token: Arc<str>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for AuthToken<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthToken")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<S> Service<Request<Bytes>> for AuthToken<S>
where
    S: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<()>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Bytes>) -> Self::Future {
        if request.header(AUTH_TOKEN_HEADER).is_none() {
            request
                .headers_mut()
                .insert(AUTH_TOKEN_HEADER.to_string(), self.token.to_string());
        }

        let mut inner = self.inner.clone();
        Box::pin(async move { inner.call(request).await })
    }
}
