use crate::traits::LocalityProvider;
use crate::{NormalizedQuery, QueryDefaults, QueryIntent};
use serde_json::Value;
use std::sync::Arc;

/// Merges a [`QueryIntent`] with the contextual defaults and prunes empty values.
///
/// Key order on the wire is `page`, `limit`, `sort`, `city_id`, `q`, then the
/// caller's extra filters. A filter named like a well-known key replaces it in place.
pub struct ParamNormalizer {
    defaults: QueryDefaults,
    locality: Arc<dyn LocalityProvider + Send + Sync>,
}

impl ParamNormalizer {
    pub fn new(defaults: QueryDefaults, locality: Arc<dyn LocalityProvider + Send + Sync>) -> Self {
        Self { defaults, locality }
    }

    pub fn defaults(&self) -> &QueryDefaults {
        &self.defaults
    }

    pub fn current_locality(&self) -> u32 {
        self.locality
            .current_locality()
            .unwrap_or(self.defaults.fallback_locality)
    }

    pub fn normalize(&self, intent: &QueryIntent) -> NormalizedQuery {
        let locality = intent.locality.unwrap_or_else(|| self.current_locality());

        let mut merged: Vec<(String, Value)> = vec![
            ("page".to_string(), intent.page.unwrap_or(self.defaults.page).into()),
            (
                "limit".to_string(),
                intent.page_size.unwrap_or(self.defaults.page_size).into(),
            ),
            (
                "sort".to_string(),
                intent.sort.unwrap_or(self.defaults.sort).as_str().into(),
            ),
            ("city_id".to_string(), locality.into()),
        ];

        if let Some(term) = &intent.term {
            upsert(&mut merged, "q", Value::String(term.clone()));
        }
        for (key, value) in &intent.filters {
            upsert(&mut merged, key, value.clone());
        }

        let pairs = merged
            .into_iter()
            .filter_map(|(key, value)| render(&value).map(|rendered| (key, rendered)))
            .collect();

        NormalizedQuery::from_pairs(pairs)
    }
}

fn upsert(target: &mut Vec<(String, Value)>, key: &str, value: Value) {
    match target.iter_mut().find(|(name, _)| name == key) {
        Some(slot) => slot.1 = value,
        None => target.push((key.to_string(), value)),
    }
}

/// Wire text for a value, or `None` when it would be null or empty.
fn render(value: &Value) -> Option<String> {
    let rendered = match value {
        Value::Null => return None,
        Value::String(text) => text.clone(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(render)
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    };

    (!rendered.is_empty()).then_some(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FixedLocality, SharedLocality, SortMode};
    use serde_json::json;

    fn normalizer_with(locality: Arc<dyn LocalityProvider + Send + Sync>) -> ParamNormalizer {
        ParamNormalizer::new(QueryDefaults::default(), locality)
    }

    #[test]
    fn unset_fields_take_defaults() {
        let normalizer = normalizer_with(Arc::new(FixedLocality(4)));
        let query = normalizer.normalize(&QueryIntent::default());

        assert_eq!(
            query.pairs(),
            &[
                ("page".to_string(), "1".to_string()),
                ("limit".to_string(), "20".to_string()),
                ("sort".to_string(), "relevance".to_string()),
                ("city_id".to_string(), "4".to_string()),
            ]
        );
        assert!(!query.contains_key("q"));
    }

    #[test]
    fn caller_fields_override_defaults_and_extras_pass_through() {
        let normalizer = normalizer_with(Arc::new(FixedLocality(4)));
        let intent = QueryIntent::for_term("drill")
            .with_page(3)
            .with_page_size(50)
            .with_sort(SortMode::PriceAsc)
            .with_locality(9)
            .with_filter("brand", "acme")
            .with_filter("in_stock", true)
            .with_filter("category_id", 12);

        let query = normalizer.normalize(&intent);
        assert_eq!(query.get("page"), Some("3"));
        assert_eq!(query.get("limit"), Some("50"));
        assert_eq!(query.get("sort"), Some("price_asc"));
        assert_eq!(query.get("city_id"), Some("9"));
        assert_eq!(query.get("q"), Some("drill"));
        assert_eq!(query.get("brand"), Some("acme"));
        assert_eq!(query.get("in_stock"), Some("true"));
        assert_eq!(query.get("category_id"), Some("12"));
    }

    #[test]
    fn null_and_empty_values_never_reach_the_wire() {
        let normalizer = normalizer_with(Arc::new(FixedLocality(1)));
        let intent = QueryIntent::for_term("")
            .with_filter("brand", Value::Null)
            .with_filter("color", "")
            .with_filter("tags", json!([]))
            .with_filter("size", "xl");

        let query = normalizer.normalize(&intent);
        for (key, value) in query.pairs() {
            assert!(!value.is_empty(), "{key} rendered empty");
        }
        assert!(!query.contains_key("q"));
        assert!(!query.contains_key("brand"));
        assert!(!query.contains_key("color"));
        assert!(!query.contains_key("tags"));
        assert_eq!(query.get("size"), Some("xl"));
    }

    #[test]
    fn extra_filter_shadows_well_known_key_in_place() {
        let normalizer = normalizer_with(Arc::new(FixedLocality(1)));
        let intent = QueryIntent::default()
            .with_filter("page", 5)
            .with_filter("sort", Value::Null);

        let query = normalizer.normalize(&intent);
        assert_eq!(query.pairs()[0], ("page".to_string(), "5".to_string()));
        assert!(!query.contains_key("sort"));
    }

    #[test]
    fn ambient_locality_is_read_per_call() {
        let selector = SharedLocality::new(None);
        let normalizer = normalizer_with(Arc::new(selector.clone()));

        assert_eq!(normalizer.normalize(&QueryIntent::default()).get("city_id"), Some("1"));
        selector.select(12);
        assert_eq!(normalizer.normalize(&QueryIntent::default()).get("city_id"), Some("12"));
    }

    #[test]
    fn arrays_render_comma_joined() {
        let normalizer = normalizer_with(Arc::new(FixedLocality(1)));
        let query = normalizer.normalize(&QueryIntent::default().with_filter("ids", json!([1, 2, 3])));
        assert_eq!(query.get("ids"), Some("1,2,3"));
    }

    #[test]
    fn array_elements_that_render_empty_are_skipped() {
        let normalizer = normalizer_with(Arc::new(FixedLocality(1)));
        let intent = QueryIntent::default()
            .with_filter("brand", json!([null, "acme", "", "bosch"]))
            .with_filter("color", json!([null, ""]));

        let query = normalizer.normalize(&intent);
        assert_eq!(query.get("brand"), Some("acme,bosch"));
        assert!(!query.contains_key("color"));
    }
}
