use crate::{Aggregations, ProductSummary, RawResponse, SearchError, SearchResult, Suggestion};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_with::{serde_as, DefaultOnNull, DisplayFromStr, PickFirst};

const DETAIL_CHARS: usize = 200;

/// `{success, data?, error?}` as every endpoint returns it.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<Value>,
}

impl<T> Envelope<T> {
    /// The backend's message; validation failures arrive as maps, not strings.
    fn message(&self) -> Option<String> {
        match self.error.as_ref()? {
            Value::Null => None,
            Value::String(message) => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
struct SearchPayload {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    products: Vec<ProductSummary>,
    #[serde_as(as = "DefaultOnNull<PickFirst<(_, DisplayFromStr)>>")]
    #[serde(default)]
    total: u64,
    #[serde(default, deserialize_with = "aggregations_or_empty")]
    aggregations: Aggregations,
}

#[serde_as]
#[derive(Debug, Default, Deserialize)]
struct AutocompletePayload {
    #[serde_as(as = "DefaultOnNull")]
    #[serde(default)]
    suggestions: Vec<Suggestion>,
}

/// Turns raw exchanges into typed results, classifying failures once.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseInterpreter;

impl ResponseInterpreter {
    pub fn interpret(&self, raw: &RawResponse) -> Result<SearchResult, SearchError> {
        let payload: SearchPayload = self.open(raw)?;
        Ok(SearchResult {
            products: payload.products,
            total: payload.total,
            aggregations: payload.aggregations,
        })
    }

    pub fn interpret_suggestions(&self, raw: &RawResponse) -> Result<Vec<Suggestion>, SearchError> {
        let payload: AutocompletePayload = self.open(raw)?;
        Ok(payload.suggestions)
    }

    /// Unwraps the envelope and hands back `data` as-is (`null` when absent).
    pub fn interpret_opaque(&self, raw: &RawResponse) -> Result<Value, SearchError> {
        self.open(raw)
    }

    fn open<T>(&self, raw: &RawResponse) -> Result<T, SearchError>
    where
        T: DeserializeOwned + Default,
    {
        if !raw.is_success() {
            return Err(SearchError::Transport {
                status: raw.status,
                details: failure_details(&raw.body),
            });
        }

        let envelope: Envelope<T> = serde_json::from_str(&raw.body)?;
        if !envelope.success {
            return Err(SearchError::Application(
                envelope
                    .message()
                    .unwrap_or_else(|| "Unknown error".to_string()),
            ));
        }

        Ok(envelope.data.unwrap_or_default())
    }
}

/// Prefers the envelope's own message; falls back to the start of the body.
fn failure_details(body: &str) -> String {
    let parsed: Result<Envelope<Value>, _> = serde_json::from_str(body);
    if let Some(message) = parsed.ok().and_then(|envelope| envelope.message()) {
        return message;
    }
    body.chars().take(DETAIL_CHARS).collect()
}

/// PHP encodes an empty facet map as `[]`; anything but an object counts as none.
fn aggregations_or_empty<'de, D>(deserializer: D) -> Result<Aggregations, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        _ => Ok(Aggregations::new()),
    }
}
