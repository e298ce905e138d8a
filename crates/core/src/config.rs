use crate::SortMode;
use std::time::Duration;

/// Values merged into every query the caller leaves unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryDefaults {
    pub page: u32,
    pub page_size: u32,
    pub sort: SortMode,
    /// Used when the ambient locality reader has nothing selected.
    pub fallback_locality: u32,
}

impl Default for QueryDefaults {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 20,
            sort: SortMode::Relevance,
            fallback_locality: 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub base_url: String,
    pub search_path: String,
    pub autocomplete_path: String,
    pub availability_path: String,
    pub request_timeout: Duration,
    pub debounce_delay: Duration,
    /// Terms shorter than this (in characters) never reach the network.
    pub min_query_chars: usize,
    pub defaults: QueryDefaults,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            search_path: "/api/search".to_string(),
            autocomplete_path: "/api/autocomplete".to_string(),
            availability_path: "/api/availability".to_string(),
            request_timeout: Duration::from_secs(10),
            debounce_delay: Duration::from_millis(300),
            min_query_chars: 2,
            defaults: QueryDefaults::default(),
        }
    }
}

impl SearchConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_debounce_delay(mut self, delay: Duration) -> Self {
        self.debounce_delay = delay;
        self
    }

    pub fn with_defaults(mut self, defaults: QueryDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    /// Whether `term` is long enough to be worth a request.
    pub fn accepts_term(&self, term: Option<&str>) -> bool {
        term.is_some_and(|term| term.chars().count() >= self.min_query_chars)
    }
}
