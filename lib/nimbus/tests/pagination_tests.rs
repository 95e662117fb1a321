//! Traversal over a real HTTP transport.

use std::ops::ControlFlow;

use assert2::{check, let_assert};
use nimbus::{ApiClient, Error, HyperClient, Page, Pager, ServiceClient, Strategy};
use serde::Deserialize;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param, query_param_is_missing},
};

#[derive(Debug, PartialEq, Deserialize)]
struct Item {
    id: String,
}

async fn client(server: &MockServer) -> ApiClient<HyperClient> {
    ApiClient::new(HyperClient::new(), format!("{}/v1/", server.uri())).expect("client")
}

fn ids(items: &[Item]) -> Vec<&str> {
    items.iter().map(|item| item.id.as_str()).collect()
}

async fn mount_linked(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/vpcs"))
        .and(query_param_is_missing("marker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [{"id": "v-1"}, {"id": "v-2"}],
            "vpcs_links": [{"rel": "next", "href": format!("{}/v1/vpcs?marker=v-2", server.uri())}]
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/vpcs"))
        .and(query_param("marker", "v-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [{"id": "v-3"}],
            "vpcs_links": [{"rel": "previous", "href": format!("{}/v1/vpcs", server.uri())}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn linked_collection_is_read_in_two_fetches() {
    let server = MockServer::start().await;
    mount_linked(&server).await;
    let client = client(&server).await;
    let url = client.service_url(&["vpcs"]).expect("url");
    let pager = Pager::new(client, url, "vpcs", Strategy::linked("vpcs_links"));

    let items: Vec<Item> = pager.all_items().await.expect("items");

    check!(ids(&items) == ["v-1", "v-2", "v-3"]);
    let_assert!(Some(requests) = server.received_requests().await);
    check!(requests.len() == 2);
}

#[tokio::test]
async fn single_page_ignores_next_links() {
    let server = MockServer::start().await;
    mount_linked(&server).await;
    let client = client(&server).await;
    let url = client.service_url(&["vpcs"]).expect("url");
    let pager = Pager::new(client, url, "vpcs", Strategy::single());

    let items: Vec<Item> = pager.all_items().await.expect("items");

    check!(ids(&items) == ["v-1", "v-2"]);
    let_assert!(Some(requests) = server.received_requests().await);
    check!(requests.len() == 1);
}

#[tokio::test]
async fn wrong_links_key_stops_after_first_page() {
    let server = MockServer::start().await;
    mount_linked(&server).await;
    let client = client(&server).await;
    let url = client.service_url(&["vpcs"]).expect("url");
    let pager = Pager::new(client, url, "vpcs", Strategy::linked("networks_links"));

    let items: Vec<Item> = pager.all_items().await.expect("items");

    check!(items.len() == 2);
}

#[tokio::test]
async fn marker_traversal_on_an_empty_collection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/actions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"actions": []})))
        .expect(1)
        .mount(&server)
        .await;
    let client = client(&server).await;
    let url = client.service_url(&["actions"]).expect("url");
    let pager = Pager::new(client, url, "actions", Strategy::marker());

    let items: Vec<Item> = pager.all_items().await.expect("items");

    check!(items.is_empty());
}

#[tokio::test]
async fn marker_carries_other_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/actions"))
        .and(query_param("limit", "2"))
        .and(query_param_is_missing("marker"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"actions": [{"id": "a-1"}, {"id": "a-2"}]})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/actions"))
        .and(query_param("limit", "2"))
        .and(query_param("marker", "a-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"actions": [{"id": "a-3"}]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/actions"))
        .and(query_param("marker", "a-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"actions": []})))
        .expect(1)
        .mount(&server)
        .await;
    let client = client(&server).await;
    let mut url = client.service_url(&["actions"]).expect("url");
    url.set_query(Some("limit=2"));
    let pager = Pager::new(client, url, "actions", Strategy::marker());

    let items: Vec<Item> = pager.all_items().await.expect("items");

    check!(ids(&items) == ["a-1", "a-2", "a-3"]);
}

#[tokio::test]
async fn handler_can_stop_early() {
    let server = MockServer::start().await;
    mount_linked(&server).await;
    let client = client(&server).await;
    let url = client.service_url(&["vpcs"]).expect("url");
    let pager = Pager::new(client, url, "vpcs", Strategy::linked("vpcs_links"));

    let mut pages = Vec::new();
    pager
        .each_page(|page: &Page| {
            pages.push(page.result().url().clone());
            Ok(ControlFlow::Break(()))
        })
        .await
        .expect("traversal");

    check!(pages.len() == 1);
    let_assert!(Some(requests) = server.received_requests().await);
    check!(requests.len() == 1);
}

#[tokio::test]
async fn failing_page_ends_the_traversal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vpcs"))
        .and(query_param_is_missing("marker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [{"id": "v-1"}],
            "vpcs_links": [{"rel": "next", "href": format!("{}/v1/vpcs?marker=v-1", server.uri())}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/vpcs"))
        .and(query_param("marker", "v-1"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let client = client(&server).await;
    let url = client.service_url(&["vpcs"]).expect("url");
    let pager = Pager::new(client, url, "vpcs", Strategy::linked("vpcs_links"));

    let result = pager.all_items::<Item>().await;

    let_assert!(Err(Error::Http { status: 503, .. }) = result);
}

#[tokio::test]
async fn malformed_links_are_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/vpcs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vpcs": [{"id": "v-1"}],
            "vpcs_links": {"next": "elsewhere"}
        })))
        .mount(&server)
        .await;
    let client = client(&server).await;
    let url = client.service_url(&["vpcs"]).expect("url");
    let pager = Pager::new(client, url, "vpcs", Strategy::linked("vpcs_links"));

    let_assert!(Err(Error::MalformedContinuation(_)) = pager.all_pages().await);
}
