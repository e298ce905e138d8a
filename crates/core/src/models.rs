use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::SearchError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Relevance,
    Name,
    PriceAsc,
    PriceDesc,
}

impl SortMode {
    pub const ALL: [SortMode; 4] = [
        SortMode::Relevance,
        SortMode::Name,
        SortMode::PriceAsc,
        SortMode::PriceDesc,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Relevance => "relevance",
            Self::Name => "name",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| SearchError::Validation(format!("unknown sort mode `{value}`")))
    }
}

/// What a caller asked for, before defaults are merged in.
///
/// Unset fields fall back to [`crate::QueryDefaults`]; `filters` carries any
/// additional key/value pairs in caller order and may shadow a well-known key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryIntent {
    pub term: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub sort: Option<SortMode>,
    pub locality: Option<u32>,
    pub filters: Vec<(String, Value)>,
}

impl QueryIntent {
    pub fn for_term(term: impl Into<String>) -> Self {
        Self {
            term: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn with_sort(mut self, sort: SortMode) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn with_locality(mut self, locality: u32) -> Self {
        self.locality = Some(locality);
        self
    }

    pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((key.into(), value.into()));
        self
    }
}

/// Canonical wire form of a query: ordered `key=value` pairs with no empty values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct NormalizedQuery {
    pairs: Vec<(String, String)>,
}

impl NormalizedQuery {
    pub(crate) fn from_pairs(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn term(&self) -> Option<&str> {
        self.get("q")
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

/// A ranked product as the backend returned it. The core never looks inside
/// beyond the convenience accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductSummary(pub Value);

impl ProductSummary {
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn name(&self) -> Option<&str> {
        self.field("name").and_then(Value::as_str)
    }
}

pub type Aggregations = BTreeMap<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub products: Vec<ProductSummary>,
    pub total: u64,
    pub aggregations: Aggregations,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty() && self.total == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Suggestion(pub Value);

impl Suggestion {
    /// Plain-string suggestions, or the `text`/`name` field of object ones.
    pub fn text(&self) -> Option<&str> {
        match &self.0 {
            Value::String(text) => Some(text),
            other => other
                .get("text")
                .or_else(|| other.get("name"))
                .and_then(Value::as_str),
        }
    }
}

/// Status and body of a completed HTTP exchange, not yet interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub product_ids: Vec<u64>,
    pub city_id: u32,
    pub user_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sort_mode_parses_wire_names() {
        for mode in SortMode::ALL {
            assert_eq!(mode.as_str().parse::<SortMode>().unwrap(), mode);
        }
        assert!("cheapest".parse::<SortMode>().is_err());
        assert_eq!(serde_json::to_value(SortMode::PriceDesc).unwrap(), json!("price_desc"));
    }

    #[test]
    fn query_string_is_url_encoded_in_order() {
        let query = NormalizedQuery::from_pairs(vec![
            ("page".to_string(), "1".to_string()),
            ("q".to_string(), "red shoes & socks".to_string()),
        ]);
        assert_eq!(query.to_query_string(), "page=1&q=red+shoes+%26+socks");
        assert_eq!(query.term(), Some("red shoes & socks"));
        assert!(!query.contains_key("sort"));
    }

    #[test]
    fn suggestion_text_accepts_strings_and_objects() {
        assert_eq!(Suggestion(json!("drill")).text(), Some("drill"));
        assert_eq!(Suggestion(json!({"text": "drill bit"})).text(), Some("drill bit"));
        assert_eq!(Suggestion(json!({"name": "drill press"})).text(), Some("drill press"));
        assert_eq!(Suggestion(json!(42)).text(), None);
    }

    #[test]
    fn raw_response_success_range() {
        assert!(RawResponse::new(200, "").is_success());
        assert!(RawResponse::new(204, "").is_success());
        assert!(!RawResponse::new(304, "").is_success());
        assert!(!RawResponse::new(500, "").is_success());
    }
}
