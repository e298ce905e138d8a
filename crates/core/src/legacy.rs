//! Old `fetchFromOpenSearch`-style call shape, routed through [`SearchOrchestrator`].

use crate::traits::{ProductLookup, SearchTransport};
use crate::{ProductSummary, QueryIntent, SearchError, SearchOrchestrator, SortMode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Once};
use tracing::{debug, warn};

/// Option bundle used by pre-orchestrator call sites.
///
/// When `ids` is present the id lookup wins and every other field is ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyOptions {
    pub ids: Option<Vec<u64>>,
    pub filters: Option<Map<String, Value>>,
    pub page: Option<u32>,
    pub items_per_page: Option<u32>,
    pub sort_column: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacySearchResult {
    pub products: Vec<ProductSummary>,
    #[serde(rename = "totalProducts")]
    pub total_products: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LegacyResponse {
    /// Id-lookup payload, exactly as the collaborator returned it.
    Lookup(Value),
    Search(LegacySearchResult),
}

pub struct LegacyAdapter<T, P>
where
    T: SearchTransport,
{
    orchestrator: Arc<SearchOrchestrator<T>>,
    lookup: P,
    deprecation: Once,
}

impl<T, P> LegacyAdapter<T, P>
where
    T: SearchTransport + Send + Sync + 'static,
    P: ProductLookup + Send + Sync,
{
    pub fn new(orchestrator: Arc<SearchOrchestrator<T>>, lookup: P) -> Self {
        Self {
            orchestrator,
            lookup,
            deprecation: Once::new(),
        }
    }

    pub fn deprecation_noticed(&self) -> bool {
        self.deprecation.is_completed()
    }

    /// Id lists go to the lookup collaborator; everything else is searched and
    /// reshaped to `{products, totalProducts}`. Search failures come back empty,
    /// lookup failures are returned as errors.
    pub async fn fetch_from_open_search(
        &self,
        options: &LegacyOptions,
    ) -> Result<LegacyResponse, SearchError> {
        self.deprecation.call_once(|| {
            warn!("fetch_from_open_search is deprecated, use SearchOrchestrator::search");
        });

        if let Some(ids) = &options.ids {
            if options.filters.is_some() || options.sort_column.is_some() {
                debug!(ids = ids.len(), "legacy options carry ids and search fields; using ids");
            }
            return self
                .lookup
                .products_by_ids(ids)
                .await
                .map(LegacyResponse::Lookup);
        }

        let result = self
            .orchestrator
            .search(legacy_intent(options))
            .await
            .unwrap_or_default();

        Ok(LegacyResponse::Search(LegacySearchResult {
            products: result.products,
            total_products: result.total,
        }))
    }
}

/// Maps legacy field names onto a [`QueryIntent`].
///
/// `filters.search` becomes the term, and every filter entry is also forwarded
/// as an extra parameter, so a filter can override `page`, `sort` and so on.
pub fn legacy_intent(options: &LegacyOptions) -> QueryIntent {
    let filters = options.filters.clone().unwrap_or_default();
    let term = filters
        .get("search")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let sort = options
        .sort_column
        .as_deref()
        .filter(|column| !column.is_empty())
        .and_then(|column| match column.parse::<SortMode>() {
            Ok(mode) => Some(mode),
            Err(error) => {
                warn!(%error, "ignoring legacy sort column");
                None
            }
        });

    QueryIntent {
        term: Some(term),
        page: options.page,
        page_size: options.items_per_page,
        sort,
        locality: None,
        filters: filters.into_iter().collect(),
    }
}
