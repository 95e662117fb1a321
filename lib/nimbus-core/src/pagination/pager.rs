//! The traversal driver.

use std::ops::ControlFlow;

use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{Page, PageResult, Strategy};
use crate::{HttpClient, HttpClientExt, RequestOptions, Result};

/// Status codes accepted for a page fetch.
const PAGE_OK_CODES: [u16; 2] = [200, 204];

/// A reusable cursor over a paginated collection.
///
/// A `Pager` keeps no continuation state: every traversal starts again from
/// the initial URL, and one pager may drive several traversals at once.
///
/// # Example
///
/// ```ignore
/// let pager = Pager::new(client, url, "vpcs", Strategy::linked("vpcs_links"));
/// let vpcs: Vec<Vpc> = pager.all_items().await?;
/// ```
#[derive(Debug, Clone)]
pub struct Pager<C> {
    client: C,
    initial_url: Url,
    collection: String,
    strategy: Strategy,
    headers: Vec<(String, String)>,
}

impl<C: HttpClient> Pager<C> {
    /// A pager over the `collection` array of the pages starting at `initial_url`.
    #[must_use]
    pub fn new(client: C, initial_url: Url, collection: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            client,
            initial_url,
            collection: collection.into(),
            strategy,
            headers: Vec::new(),
        }
    }

    /// Adds a header sent with every page request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// URL of the first page.
    #[must_use]
    pub fn initial_url(&self) -> &Url {
        &self.initial_url
    }

    /// Body key of the item array.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// How following pages are found.
    #[must_use]
    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    async fn fetch(&self, url: Url) -> Result<Page> {
        debug!(%url, collection = %self.collection, "fetching page");
        let options = self.headers.iter().fold(
            RequestOptions::new().ok_codes(PAGE_OK_CODES),
            |options, (name, value)| options.header(name.clone(), value.clone()),
        );
        let response = self.client.get(&url, &options).await?;
        let result = PageResult::from_response(url, response)?;
        Ok(self.strategy.page(result, &self.collection))
    }

    /// Visit pages in order until the collection ends or `handler` breaks.
    ///
    /// Pages are fetched one at a time, each only after the handler returned
    /// for the previous one. An empty page ends the traversal without being
    /// handed to `handler`. The first error, from the transport, the page or
    /// the handler, is returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns the first fetch, decode, continuation or handler error.
    pub async fn each_page<F>(&self, mut handler: F) -> Result<()>
    where
        F: FnMut(&Page) -> Result<ControlFlow<()>>,
    {
        let mut url = self.initial_url.clone();
        let mut fetched = 0_usize;
        loop {
            let page = self.fetch(url).await?;
            fetched += 1;

            if page.is_empty()? {
                debug!(fetched, collection = %self.collection, "empty page, traversal done");
                return Ok(());
            }
            if handler(&page)?.is_break() {
                debug!(fetched, collection = %self.collection, "traversal stopped by handler");
                return Ok(());
            }
            match page.next_url()? {
                Some(next) => url = next,
                None => {
                    debug!(fetched, collection = %self.collection, "last page, traversal done");
                    return Ok(());
                }
            }
        }
    }

    /// Fetch every page and concatenate their items in order.
    ///
    /// # Errors
    ///
    /// Returns the first traversal or item decode error.
    pub async fn all_items<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        self.each_page(|page| {
            items.extend(page.items::<T>()?);
            Ok(ControlFlow::Continue(()))
        })
        .await?;
        Ok(items)
    }

    /// Fetch every non-empty page.
    ///
    /// # Errors
    ///
    /// Returns the first traversal error.
    pub async fn all_pages(&self) -> Result<Vec<Page>> {
        let mut pages = Vec::new();
        self.each_page(|page| {
            pages.push(page.clone());
            Ok(ControlFlow::Continue(()))
        })
        .await?;
        Ok(pages)
    }

    /// Fetch only the first page, whatever it holds.
    ///
    /// # Errors
    ///
    /// Returns the fetch or decode error.
    pub async fn first_page(&self) -> Result<Page> {
        self.fetch(self.initial_url.clone()).await
    }

    /// Decode the items of the first page only.
    ///
    /// # Errors
    ///
    /// Returns the fetch or item decode error.
    pub async fn first_items<T: DeserializeOwned>(&self) -> Result<Vec<T>> {
        self.first_page().await?.items()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use assert2::{check, let_assert};
    use bytes::Bytes;
    use serde_json::{Value, json};

    use super::*;
    use crate::{Error, Request, Response};

    /// Serves canned JSON bodies by URL and records every fetch.
    #[derive(Default)]
    struct Canned {
        pages: HashMap<String, (u16, Value)>,
        fetched: Mutex<Vec<String>>,
    }

    impl Canned {
        fn with(mut self, url: &str, body: Value) -> Self {
            self.pages.insert(url.to_string(), (200, body));
            self
        }

        fn with_status(mut self, url: &str, status: u16) -> Self {
            self.pages.insert(url.to_string(), (status, Value::Null));
            self
        }

        fn fetched(&self) -> Vec<String> {
            self.fetched.lock().map(|f| f.clone()).unwrap_or_default()
        }
    }

    impl HttpClient for Canned {
        fn execute(
            &self,
            request: Request<Bytes>,
        ) -> impl Future<Output = Result<Response<Bytes>>> + Send {
            let url = request.url().to_string();
            if let Ok(mut fetched) = self.fetched.lock() {
                fetched.push(url.clone());
            }
            let response = match self.pages.get(&url) {
                Some((status, Value::Null)) => Response::new(*status, HashMap::new(), Bytes::new()),
                Some((status, body)) => Response::new(*status, HashMap::new(), Bytes::from(body.to_string())),
                None => Response::new(404, HashMap::new(), Bytes::new()),
            };
            async move { Ok(response) }
        }
    }

    #[derive(Debug, PartialEq, serde::Deserialize)]
    struct Vpc {
        id: String,
    }

    const FIRST: &str = "https://vpc.example.com/v1/vpcs?limit=2";
    const SECOND: &str = "https://vpc.example.com/v1/vpcs?limit=2&marker=v-2";

    fn linked_pages() -> Canned {
        Canned::default()
            .with(
                FIRST,
                json!({
                    "vpcs": [{"id": "v-1"}, {"id": "v-2"}],
                    "vpcs_links": [{"rel": "next", "href": SECOND}]
                }),
            )
            .with(SECOND, json!({"vpcs": [{"id": "v-3"}], "vpcs_links": []}))
    }

    fn url(raw: &str) -> Url {
        Url::parse(raw).expect("url")
    }

    #[tokio::test]
    async fn linked_traversal_collects_every_item() {
        let client = linked_pages();
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::linked("vpcs_links"));

        let vpcs: Vec<Vpc> = pager.all_items().await.expect("items");

        let ids: Vec<_> = vpcs.iter().map(|v| v.id.as_str()).collect();
        check!(ids == ["v-1", "v-2", "v-3"]);
        check!(client.fetched() == [FIRST, SECOND]);
    }

    #[tokio::test]
    async fn pager_is_reusable() {
        let client = linked_pages();
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::linked("vpcs_links"));

        let first = pager.all_pages().await.expect("pages");
        let second = pager.all_pages().await.expect("pages");

        check!(first.len() == 2);
        check!(second.len() == 2);
        check!(client.fetched().len() == 4);
    }

    #[tokio::test]
    async fn single_strategy_fetches_once_despite_next_link() {
        let client = linked_pages();
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::single());

        let vpcs: Vec<Vpc> = pager.all_items().await.expect("items");

        check!(vpcs.len() == 2);
        check!(client.fetched() == [FIRST]);
    }

    #[tokio::test]
    async fn marker_traversal_on_empty_first_page() {
        let client = Canned::default().with(FIRST, json!({"vpcs": []}));
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::marker());

        let mut handled = 0;
        pager
            .each_page(|_| {
                handled += 1;
                Ok(ControlFlow::Continue(()))
            })
            .await
            .expect("traversal");
        let vpcs: Vec<Vpc> = pager.all_items().await.expect("items");

        check!(handled == 0);
        check!(vpcs.is_empty());
        check!(client.fetched() == [FIRST, FIRST]);
    }

    #[tokio::test]
    async fn marker_traversal_follows_last_id() {
        let client = Canned::default()
            .with(FIRST, json!({"vpcs": [{"id": "v-1"}, {"id": "v-2"}]}))
            .with(SECOND, json!({"vpcs": []}));
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::marker());

        let vpcs: Vec<Vpc> = pager.all_items().await.expect("items");

        check!(vpcs.len() == 2);
        check!(client.fetched() == [FIRST, SECOND]);
    }

    #[tokio::test]
    async fn handler_break_stops_traversal() {
        let client = linked_pages();
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::linked("vpcs_links"));

        let mut seen = Vec::new();
        pager
            .each_page(|page| {
                seen.extend(page.items::<Vpc>()?);
                Ok(ControlFlow::Break(()))
            })
            .await
            .expect("traversal");

        check!(seen.len() == 2);
        check!(client.fetched() == [FIRST]);
    }

    #[tokio::test]
    async fn handler_error_is_returned_unchanged() {
        let client = linked_pages();
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::linked("vpcs_links"));

        let result = pager
            .each_page(|_| Err(Error::invalid_request("stop here")))
            .await;

        let_assert!(Err(Error::InvalidRequest(message)) = result);
        check!(message == "stop here");
        check!(client.fetched() == [FIRST]);
    }

    #[tokio::test]
    async fn fetch_error_ends_traversal() {
        let client = Canned::default()
            .with(
                FIRST,
                json!({"vpcs": [{"id": "v-1"}], "vpcs_links": [{"rel": "next", "href": SECOND}]}),
            )
            .with_status(SECOND, 500);
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::linked("vpcs_links"));

        let result = pager.all_items::<Vpc>().await;

        let_assert!(Err(Error::Http { status: 500, .. }) = result);
        check!(client.fetched() == [FIRST, SECOND]);
    }

    #[tokio::test]
    async fn no_content_page_is_empty() {
        let client = Canned::default().with_status(FIRST, 204);
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::marker());

        let vpcs: Vec<Vpc> = pager.all_items().await.expect("items");

        check!(vpcs.is_empty());
    }

    #[tokio::test]
    async fn first_items_does_not_continue() {
        let client = linked_pages();
        let pager = Pager::new(&client, url(FIRST), "vpcs", Strategy::linked("vpcs_links"))
            .with_header("X-Request-Id", "req-7");

        let vpcs: Vec<Vpc> = pager.first_items().await.expect("items");

        check!(vpcs.len() == 2);
        check!(client.fetched() == [FIRST]);
    }
}
