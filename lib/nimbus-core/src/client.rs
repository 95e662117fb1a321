//! HTTP client traits.
//!
//! - [`HttpClient`] - Low-level HTTP execution, injected by the caller
//! - [`HttpClientExt`] - Verb helpers that serialize bodies and check status codes
//! - [`ServiceClient`] - A client bound to one service endpoint
//!
//! The core never opens a connection itself. Pooling, TLS, authentication
//! and retries all live behind whatever implements [`HttpClient`].

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use url::Url;

use crate::{Error, Method, Request, RequestOptions, Response, Result};

/// Core HTTP client trait.
///
/// Implementations are expected to be cheap to share and to support
/// concurrent use from several traversals.
pub trait HttpClient: Send + Sync {
    /// Execute an HTTP request and return the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be completed (network, TLS,
    /// timeout). Status checking is left to [`HttpClientExt`].
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send;
}

impl<T: HttpClient + ?Sized> HttpClient for &T {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).execute(request)
    }
}

impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    fn execute(
        &self,
        request: Request<Bytes>,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        (**self).execute(request)
    }
}

/// Extension trait for [`HttpClient`] with one helper per verb.
///
/// Every helper sends `Accept: application/json`, serializes the body (if
/// any) as JSON and fails with [`Error::Http`] when the status is not one of
/// the accepted codes (see [`Method::default_ok_codes`]).
pub trait HttpClientExt: HttpClient {
    /// Send a request and check its status against the accepted codes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails, or if the
    /// status is unexpected.
    fn request<B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        url: &Url,
        body: Option<&B>,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        let prepared = prepare(method, url, body, options);
        async move {
            let (request, ok_codes) = prepared?;
            let response = self.execute(request).await?;
            check_status(response, &ok_codes)
        }
    }

    /// Execute a GET request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is unexpected.
    fn get(
        &self,
        url: &Url,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.request::<()>(Method::Get, url, None, options)
    }

    /// Execute a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails, or the status is unexpected.
    fn post<B: serde::Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.request(Method::Post, url, Some(body), options)
    }

    /// Execute a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails, or the status is unexpected.
    fn put<B: serde::Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.request(Method::Put, url, Some(body), options)
    }

    /// Execute a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the request fails, or the status is unexpected.
    fn patch<B: serde::Serialize + ?Sized>(
        &self,
        url: &Url,
        body: &B,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.request(Method::Patch, url, Some(body), options)
    }

    /// Execute a DELETE request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is unexpected.
    fn delete(
        &self,
        url: &Url,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.request::<()>(Method::Delete, url, None, options)
    }

    /// Execute a HEAD request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the status is unexpected.
    fn head(
        &self,
        url: &Url,
        options: &RequestOptions,
    ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
        self.request::<()>(Method::Head, url, None, options)
    }
}

impl<T: HttpClient + ?Sized> HttpClientExt for T {}

fn prepare<B: serde::Serialize + ?Sized>(
    method: Method,
    url: &Url,
    body: Option<&B>,
    options: &RequestOptions,
) -> Result<(Request<Bytes>, Vec<u16>)> {
    let mut builder = Request::builder(method, url.clone())
        .header("Accept", "application/json")
        .headers(options.headers().iter().cloned());
    if let Some(body) = body {
        builder = builder.json(body)?;
    }
    tracing::trace!(%method, %url, "prepared request");
    Ok((builder.build(), options.ok_codes_for(method).to_vec()))
}

fn check_status(response: Response<Bytes>, ok_codes: &[u16]) -> Result<Response<Bytes>> {
    let status = response.status();
    if ok_codes.contains(&status) {
        return Ok(response);
    }
    let reason = http::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("unexpected status");
    Err(Error::http_with_body(status, reason, response.into_body()))
}

// ============================================================================
// Service Client Trait
// ============================================================================

/// A client bound to one service endpoint (e.g. `https://vpc.example.com/v1/`).
///
/// Resource modules take a `ServiceClient` and build their URLs from it
/// with [`ServiceClient::service_url`].
///
/// # Example
///
/// ```ignore
/// let url = client.service_url(&["vpcs", vpc_id])?;
/// let vpc: Vpc = client.get(&url, &RequestOptions::new()).await?.json_at("vpc")?;
/// ```
pub trait ServiceClient: HttpClient + Clone {
    /// Root URL of the service.
    fn endpoint(&self) -> &Url;

    /// Append percent-encoded path segments to the endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRequest`] if the endpoint cannot carry a path.
    fn service_url(&self, parts: &[&str]) -> Result<Url> {
        let mut url = self.endpoint().clone();
        url.path_segments_mut()
            .map_err(|()| {
                Error::invalid_request(format!("endpoint cannot be a base: {}", self.endpoint()))
            })?
            .pop_if_empty()
            .extend(parts);
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use assert2::{check, let_assert};

    use super::*;

    /// Answers every request with a fixed status and records what was sent.
    #[derive(Default)]
    struct Recorder {
        status: u16,
        sent: Mutex<Vec<Request<Bytes>>>,
    }

    impl HttpClient for Recorder {
        fn execute(
            &self,
            request: Request<Bytes>,
        ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
            if let Ok(mut sent) = self.sent.lock() {
                sent.push(request);
            }
            let status = self.status;
            async move { Ok(Response::new(status, HashMap::new(), Bytes::from("{}"))) }
        }
    }

    #[derive(Clone)]
    struct Bound(Url);

    impl HttpClient for Bound {
        fn execute(
            &self,
            _request: Request<Bytes>,
        ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
            async { Err(Error::connection("offline")) }
        }
    }

    impl ServiceClient for Bound {
        fn endpoint(&self) -> &Url {
            &self.0
        }
    }

    fn url() -> Url {
        Url::parse("https://compute.example.com/v2/servers").expect("valid URL")
    }

    #[tokio::test]
    async fn post_serializes_body_and_accepts_default_codes() {
        let client = Recorder {
            status: 202,
            ..Recorder::default()
        };
        let body = serde_json::json!({"server": {"name": "web-1"}});

        let response = client
            .post(&url(), &body, &RequestOptions::new())
            .await
            .expect("202 is accepted for POST");
        check!(response.status() == 202);

        let sent = client.sent.lock().expect("lock");
        let_assert!([request] = sent.as_slice());
        check!(request.method() == Method::Post);
        check!(request.header("Content-Type") == Some("application/json"));
        check!(request.header("Accept") == Some("application/json"));
        check!(request.body().map(Bytes::as_ref) == Some(br#"{"server":{"name":"web-1"}}"#.as_slice()));
    }

    #[tokio::test]
    async fn unexpected_status_is_an_http_error() {
        let client = Recorder {
            status: 200,
            ..Recorder::default()
        };

        let result = client.delete(&url(), &RequestOptions::new()).await;

        let_assert!(Err(Error::Http { status: 200, body: Some(body), .. }) = result);
        check!(body.as_ref() == b"{}");
    }

    #[tokio::test]
    async fn ok_codes_override_and_extra_headers() {
        let client = Recorder {
            status: 200,
            ..Recorder::default()
        };
        let options = RequestOptions::new()
            .ok_codes([200, 201])
            .header("X-OpenStack-Request-Id", "req-1");

        let result = client.put(&url(), &serde_json::json!({}), &options).await;
        check!(result.is_ok());

        let sent = client.sent.lock().expect("lock");
        let_assert!([request] = sent.as_slice());
        check!(request.header("X-OpenStack-Request-Id") == Some("req-1"));
    }

    #[tokio::test]
    async fn shared_references_are_clients() {
        let client = Arc::new(Recorder {
            status: 200,
            ..Recorder::default()
        });

        async fn fetch<C: HttpClient>(client: C) -> Result<Response<Bytes>> {
            client.get(&url(), &RequestOptions::new()).await
        }

        let by_arc = fetch(Arc::clone(&client)).await;
        let by_ref = fetch(&*client).await;

        check!(by_arc.is_ok());
        check!(by_ref.is_ok());
        check!(client.sent.lock().expect("lock").len() == 2);
    }

    #[test]
    fn service_url_appends_encoded_segments() {
        let client = Bound(Url::parse("https://vpc.example.com/v1/").expect("valid URL"));

        let url = client.service_url(&["vpcs", "a b", "subnets"]).expect("url");
        check!(url.as_str() == "https://vpc.example.com/v1/vpcs/a%20b/subnets");

        let client = Bound(Url::parse("https://vpc.example.com/v1").expect("valid URL"));
        let url = client.service_url(&["vpcs"]).expect("url");
        check!(url.as_str() == "https://vpc.example.com/v1/vpcs");
    }

    #[test]
    fn service_url_rejects_cannot_be_a_base() {
        let client = Bound(Url::parse("mailto:ops@example.com").expect("valid URL"));

        let_assert!(Err(Error::InvalidRequest(_)) = client.service_url(&["vpcs"]));
    }
}
