use crate::{AvailabilityRequest, NormalizedQuery, RawResponse, SearchError};
use async_trait::async_trait;
use serde_json::Value;

/// Network side of the search and autocomplete endpoints.
///
/// Implementations return the raw exchange; envelope handling happens in
/// [`crate::ResponseInterpreter`]. Dropping the returned future must abort the call.
#[async_trait]
pub trait SearchTransport {
    async fn fetch_search(&self, query: &NormalizedQuery) -> Result<RawResponse, SearchError>;

    async fn fetch_autocomplete(&self, term: &str) -> Result<RawResponse, SearchError>;
}

/// Id-list lookup used by the legacy call path. The returned shape is opaque.
#[async_trait]
pub trait ProductLookup {
    async fn products_by_ids(&self, ids: &[u64]) -> Result<Value, SearchError>;
}

#[async_trait]
pub trait AvailabilityLookup {
    async fn dynamic_data(&self, request: &AvailabilityRequest) -> Result<Value, SearchError>;
}

/// Reads the locality the session is currently scoped to, if any.
pub trait LocalityProvider {
    fn current_locality(&self) -> Option<u32>;
}

/// Receives failures that were downgraded to an empty result.
pub trait SearchObserver {
    fn on_failure(&self, error: &SearchError);
}
