//! A transport bound to one service endpoint.

use bytes::Bytes;
use url::Url;

use crate::{Error, HttpClient, Request, Response, Result, ServiceClient};

/// Binds an [`HttpClient`] to a service endpoint.
///
/// One transport is typically shared by several services (compute,
/// networking, clustering), each wrapped in its own `ApiClient`. The
/// endpoint always ends with `/` so that relative joins keep its path.
///
/// # Example
///
/// ```ignore
/// use nimbus::{ApiClient, HyperClient};
///
/// let http = HyperClient::builder().with_auth_token(token).build();
/// let compute = ApiClient::new(http.clone(), "https://compute.example.com/v2.1")?;
/// let network = ApiClient::new(http, "https://vpc.example.com/v1/")?;
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient<C> {
    client: C,
    endpoint: Url,
}

impl<C> ApiClient<C> {
    /// Bind `client` to the endpoint at `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `endpoint` does not parse, or
    /// [`Error::InvalidRequest`] if it cannot carry a path.
    pub fn new(client: C, endpoint: impl AsRef<str>) -> Result<Self> {
        let endpoint = Url::parse(endpoint.as_ref()).map_err(Error::InvalidUrl)?;
        Self::with_url(client, endpoint)
    }

    /// Bind `client` to an already parsed endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if `endpoint` cannot carry a path.
    pub fn with_url(client: C, mut endpoint: Url) -> Result<Self> {
        if endpoint.cannot_be_a_base() {
            return Err(Error::invalid_request(format!(
                "endpoint cannot be a base: {endpoint}"
            )));
        }
        if !endpoint.path().ends_with('/') {
            let path = format!("{}/", endpoint.path());
            endpoint.set_path(&path);
        }
        Ok(Self { client, endpoint })
    }

    /// The wrapped transport.
    #[must_use]
    pub const fn inner(&self) -> &C {
        &self.client
    }

    /// Unwrap the transport.
    #[must_use]
    pub fn into_inner(self) -> C {
        self.client
    }
}

impl<C: HttpClient> HttpClient for ApiClient<C> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.client.execute(request)
    }
}

impl<C: HttpClient + Clone> ServiceClient for ApiClient<C> {
    fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}
