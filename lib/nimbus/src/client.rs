//! HTTP transport built on hyper-util, with tower middleware.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::Layer;
use tower::retry::RetryLayer;
use tower::util::BoxCloneService;
use tower_service::Service;
use tracing::trace;

use crate::{
    Error, Request, Response, Result,
    config::{ClientConfig, ClientConfigBuilder},
    connector::https_connector,
    middleware::{AuthTokenLayer, LoggingLayer, RetryPolicy},
};

/// Type-erased middleware stack.
pub type BoxedService = BoxCloneService<Request<Bytes>, Response<Bytes>, Error>;

/// Future returned by the client's tower [`Service`] implementation.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response<Bytes>>> + Send + 'static>>;

/// Shares one middleware stack between clones of a client.
///
/// `BoxCloneService` is not `Sync`; each call clones the stack under the
/// lock and drives the clone outside it.
#[derive(Clone)]
struct SharedService {
    inner: Arc<Mutex<BoxedService>>,
}

impl SharedService {
    fn new(service: BoxedService) -> Self {
        Self {
            inner: Arc::new(Mutex::new(service)),
        }
    }

    fn call(&self, request: Request<Bytes>) -> ServiceFuture {
        let mut service = self
            .inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        Box::pin(async move { service.call(request).await })
    }
}

/// The bottom of the stack: one hyper exchange per request.
#[derive(Clone)]
struct Transport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: ClientConfig,
}

impl Transport {
    fn new(config: ClientConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(&config));
        Self { inner, config }
    }

    fn to_hyper(&self, request: Request<Bytes>) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());
        if !headers.keys().any(|name| name.eq_ignore_ascii_case("user-agent")) {
            builder = builder.header(http::header::USER_AGENT, self.config.user_agent.as_str());
        }
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body.map_or_else(Full::default, Full::new))
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    fn response_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    async fn send(&self, request: Request<Bytes>) -> Result<Response<Bytes>> {
        let hyper_request = self.to_hyper(request)?;
        trace!(uri = %hyper_request.uri(), "sending over hyper");

        let exchange = async {
            let response = self
                .inner
                .request(hyper_request)
                .await
                .map_err(Self::map_error)?;
            let status = response.status().as_u16();
            let headers = Self::response_headers(response.headers());
            let body = response
                .into_body()
                .collect()
                .await
                .map_err(|e| Error::connection(e.to_string()))?
                .to_bytes();
            Ok(Response::new(status, headers, body))
        };

        tokio::time::timeout(self.config.timeout, exchange)
            .await
            .map_err(|_| Error::Timeout)?
    }

    #[allow(clippy::needless_pass_by_value)]
    fn map_error(err: hyper_util::client::legacy::Error) -> Error {
        let message = err.to_string();
        if err.is_connect() {
            return Error::connection(message);
        }
        if ["ssl", "tls", "certificate"]
            .iter()
            .any(|needle| message.contains(needle))
        {
            return Error::tls(message);
        }
        Error::connection(message)
    }
}

impl Service<Request<Bytes>> for Transport {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { transport.send(request).await })
    }
}

/// Pooled HTTP(S) client with a tower middleware stack.
///
/// `HyperClient` implements [`crate::HttpClient`], so it can be bound to a
/// service endpoint with [`crate::ApiClient`] and handed to every resource
/// module. Clones share the connection pool and the middleware.
///
/// # Example
///
/// ```ignore
/// use nimbus::{ApiClient, HyperClient};
///
/// let http = HyperClient::builder()
///     .with_auth_token(token)
///     .with_retry(2)
///     .with_logging()
///     .build();
/// let network = ApiClient::new(http, "https://vpc.example.com/v1/")?;
/// ```
#[derive(Clone)]
pub struct HyperClient {
    service: SharedService,
    config: ClientConfig,
}

impl std::fmt::Debug for HyperClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl HyperClient {
    /// A client with the default configuration and no middleware.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    /// A client with `config` and no middleware.
    #[must_use]
    pub fn with_config(config: ClientConfig) -> Self {
        let transport = Transport::new(config.clone());
        Self {
            service: SharedService::new(BoxCloneService::new(transport)),
            config,
        }
    }

    /// Configure a client.
    #[must_use]
    pub fn builder() -> HyperClientBuilder {
        HyperClientBuilder::default()
    }

    /// The transport configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }
}

impl Default for HyperClient {
    fn default() -> Self {
        Self::new()
    }
}

impl nimbus_core::HttpClient for HyperClient {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.service.call(request)
    }
}

impl Service<Request<Bytes>> for HyperClient {
    type Response = Response<Bytes>;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Bytes>) -> Self::Future {
        self.service.call(request)
    }
}

type LayerFn = Arc<dyn Fn(BoxedService) -> BoxedService + Send + Sync>;

/// Builder for [`HyperClient`].
///
/// Each layer wraps the stack built so far, so the layer added last sees a
/// request first:
///
/// ```ignore
/// // logging -> auth token -> retry -> transport
/// let client = HyperClient::builder()
///     .with_retry(3)
///     .with_auth_token(token)
///     .with_logging()
///     .build();
/// ```
#[derive(Default)]
pub struct HyperClientBuilder {
    config: ClientConfigBuilder,
    layers: Vec<LayerFn>,
}

impl std::fmt::Debug for HyperClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperClientBuilder")
            .field("config", &self.config)
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl HyperClientBuilder {
    /// Set the exchange deadline.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.timeout(timeout);
        self
    }

    /// Set the connect deadline.
    #[must_use]
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.connect_timeout(timeout);
        self
    }

    /// Set the idle connections kept per host.
    #[must_use]
    pub fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.config = self.config.pool_idle_per_host(count);
        self
    }

    /// Set the idle connection lifetime.
    #[must_use]
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.pool_idle_timeout(timeout);
        self
    }

    /// Set the `User-Agent` header.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.user_agent(user_agent);
        self
    }

    /// Wrap the stack in any tower layer over nimbus requests.
    #[must_use]
    pub fn layer<L>(mut self, layer: L) -> Self
    where
        L: Layer<BoxedService> + Send + Sync + 'static,
        L::Service: Service<Request<Bytes>, Response = Response<Bytes>, Error = Error>
            + Clone
            + Send
            + 'static,
        <L::Service as Service<Request<Bytes>>>::Future: Send,
    {
        self.layers
            .push(Arc::new(move |service| BoxCloneService::new(layer.layer(service))));
        self
    }

    /// Send `X-Auth-Token` with every request.
    #[must_use]
    pub fn with_auth_token(self, token: impl Into<String>) -> Self {
        self.layer(AuthTokenLayer::new(token))
    }

    /// Retry idempotent requests on connection errors, timeouts, 5xx and 429.
    #[must_use]
    pub fn with_retry(self, max_retries: u32) -> Self {
        self.layer(RetryLayer::new(RetryPolicy::new(max_retries)))
    }

    /// Log every exchange at info level.
    #[must_use]
    pub fn with_logging(self) -> Self {
        self.layer(LoggingLayer::new())
    }

    /// Log every exchange at debug level, headers included.
    #[must_use]
    pub fn with_debug_logging(self) -> Self {
        self.layer(LoggingLayer::debug())
    }

    /// Assemble the client.
    #[must_use]
    pub fn build(self) -> HyperClient {
        let config = self.config.build();
        let service = self.layers.iter().fold(
            BoxCloneService::new(Transport::new(config.clone())),
            |service, layer| layer(service),
        );
        HyperClient {
            service: SharedService::new(service),
            config,
        }
    }
}
