//! Transport and middleware behavior against a mock server.

use std::time::Duration;

use assert2::{check, let_assert};
use nimbus::{Error, HttpClient, HttpClientExt, HyperClient, Method, Request, RequestOptions};
use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, header_exists, method, path},
};

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{route}", server.uri())).expect("url")
}

#[tokio::test]
async fn get_sends_accept_and_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vpcs/v-1"))
        .and(header("Accept", "application/json"))
        .and(header("User-Agent", nimbus::DEFAULT_USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vpc": {"id": "v-1"}})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::new();
    let response = client
        .get(&url(&server, "/v1/vpcs/v-1"), &RequestOptions::new())
        .await
        .expect("response");

    let vpc: serde_json::Value = response.json_at("vpc").expect("vpc");
    check!(vpc["id"] == "v-1");
}

#[tokio::test]
async fn post_sends_json_and_checks_ok_codes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/vpcs"))
        .and(body_json(json!({"vpc": {"name": "private"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"vpc": {}})))
        .mount(&server)
        .await;

    let client = HyperClient::new();
    let body = json!({"vpc": {"name": "private"}});

    let result = client
        .post(&url(&server, "/v1/vpcs"), &body, &RequestOptions::new())
        .await;
    let_assert!(Err(Error::Http { status: 200, .. }) = result);

    let accepted = client
        .post(
            &url(&server, "/v1/vpcs"),
            &body,
            &RequestOptions::new().ok_codes([200]),
        )
        .await;
    check!(accepted.is_ok());
}

#[tokio::test]
async fn unexpected_status_keeps_the_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vpcs/missing"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"NeutronError": {"message": "Vpc missing could not be found"}})),
        )
        .mount(&server)
        .await;

    let client = HyperClient::new();
    let result = client
        .get(&url(&server, "/v1/vpcs/missing"), &RequestOptions::new())
        .await;

    let_assert!(Err(err) = result);
    check!(err.is_not_found());
    let_assert!(Some(Ok(body)) = err.decode_body::<serde_json::Value>());
    check!(body["NeutronError"]["message"] == "Vpc missing could not be found");
}

#[tokio::test]
async fn auth_token_is_sent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2.1/servers/detail"))
        .and(header("X-Auth-Token", "gAAAA-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"servers": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::builder()
        .with_auth_token("gAAAA-token")
        .with_logging()
        .build();
    let response = client
        .get(&url(&server, "/v2.1/servers/detail"), &RequestOptions::new())
        .await;

    check!(response.is_ok());
}

#[tokio::test]
async fn retry_replays_idempotent_requests() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vpcs"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let client = HyperClient::builder().with_retry(2).build();
    let request = Request::builder(Method::Get, url(&server, "/v1/vpcs")).build();

    let response = client.execute(request).await.expect("response");

    check!(response.status() == 503);
}

#[tokio::test]
async fn retry_never_replays_post() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2.1/servers"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::builder().with_retry(3).build();
    let result = client
        .post(
            &url(&server, "/v2.1/servers"),
            &json!({"server": {}}),
            &RequestOptions::new(),
        )
        .await;

    let_assert!(Err(Error::Http { status: 503, .. }) = result);
}

#[tokio::test]
async fn retry_ignores_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/vpcs/v-1"))
        .respond_with(ResponseTemplate::new(409))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::builder().with_retry(3).build();
    let result = client
        .delete(&url(&server, "/v1/vpcs/v-1"), &RequestOptions::new())
        .await;

    let_assert!(Err(Error::Http { status: 409, .. }) = result);
}

#[tokio::test]
async fn extra_headers_are_sent() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/v1/vpcs/v-1"))
        .and(header_exists("X-OpenStack-Request-ID"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = HyperClient::new();
    let result = client
        .head(
            &url(&server, "/v1/vpcs/v-1"),
            &RequestOptions::new().header("X-OpenStack-Request-ID", "req-1"),
        )
        .await;

    check!(result.is_ok());
}

#[tokio::test]
async fn slow_answers_time_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let client = HyperClient::builder()
        .timeout(Duration::from_millis(100))
        .build();
    let request = Request::builder(Method::Get, url(&server, "/slow")).build();

    let_assert!(Err(err) = client.execute(request).await);
    check!(err.is_timeout());
}

#[tokio::test]
async fn refused_connection_is_a_connection_error() {
    let client = HyperClient::new();
    let request = Request::builder(Method::Get, Url::parse("http://127.0.0.1:1/").expect("url")).build();

    let_assert!(Err(err) = client.execute(request).await);
    check!(err.is_connection());
}
