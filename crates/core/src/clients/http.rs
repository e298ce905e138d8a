use crate::interpreter::ResponseInterpreter;
use crate::traits::{AvailabilityLookup, SearchTransport};
use crate::{AvailabilityRequest, NormalizedQuery, RawResponse, SearchConfig, SearchError};
use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// reqwest-backed client for the search, autocomplete and availability endpoints.
pub struct HttpSearchClient {
    client: Arc<Client>,
    base_url: Url,
    search_path: String,
    autocomplete_path: String,
    availability_path: String,
}

impl HttpSearchClient {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            client: Arc::new(client),
            base_url: Url::parse(&config.base_url)?,
            search_path: config.search_path.clone(),
            autocomplete_path: config.autocomplete_path.clone(),
            availability_path: config.availability_path.clone(),
        })
    }

    pub fn search_url(&self, query: &NormalizedQuery) -> Result<Url, SearchError> {
        let mut url = self.base_url.join(&self.search_path)?;
        url.query_pairs_mut().extend_pairs(query.pairs());
        Ok(url)
    }

    pub fn autocomplete_url(&self, term: &str) -> Result<Url, SearchError> {
        let mut url = self.base_url.join(&self.autocomplete_path)?;
        url.query_pairs_mut().append_pair("q", term);
        Ok(url)
    }

    pub fn availability_url(&self, request: &AvailabilityRequest) -> Result<Url, SearchError> {
        let product_ids = request
            .product_ids
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut url = self.base_url.join(&self.availability_path)?;
        url.query_pairs_mut()
            .append_pair("city_id", &request.city_id.to_string())
            .append_pair("product_ids", &product_ids);
        Ok(url)
    }

    async fn get(&self, url: Url) -> Result<RawResponse, SearchError> {
        debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

#[async_trait]
impl SearchTransport for HttpSearchClient {
    async fn fetch_search(&self, query: &NormalizedQuery) -> Result<RawResponse, SearchError> {
        let url = self.search_url(query)?;
        self.get(url).await
    }

    async fn fetch_autocomplete(&self, term: &str) -> Result<RawResponse, SearchError> {
        let url = self.autocomplete_url(term)?;
        self.get(url).await
    }
}

#[async_trait]
impl AvailabilityLookup for HttpSearchClient {
    /// `user_id` is not sent; the backend derives it from the session.
    async fn dynamic_data(&self, request: &AvailabilityRequest) -> Result<Value, SearchError> {
        let url = self.availability_url(request)?;
        let raw = self.get(url).await?;
        ResponseInterpreter.interpret_opaque(&raw)
    }
}
