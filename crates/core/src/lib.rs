pub mod clients;
pub mod config;
pub mod controller;
pub mod debounce;
pub mod error;
pub mod interpreter;
pub mod legacy;
pub mod locality;
pub mod models;
pub mod normalizer;
pub mod observer;
pub mod orchestrator;
pub mod traits;

pub use clients::{AvailabilityProductLookup, HttpSearchClient};
pub use config::{QueryDefaults, SearchConfig};
pub use controller::RequestController;
pub use debounce::DebounceScheduler;
pub use error::SearchError;
pub use interpreter::ResponseInterpreter;
pub use legacy::{legacy_intent, LegacyAdapter, LegacyOptions, LegacyResponse, LegacySearchResult};
pub use locality::{FixedLocality, SharedLocality};
pub use models::{
    Aggregations, AvailabilityRequest, NormalizedQuery, ProductSummary, QueryIntent, RawResponse,
    SearchResult, SortMode, Suggestion,
};
pub use normalizer::ParamNormalizer;
pub use observer::TracingObserver;
pub use orchestrator::{OrchestratorBuilder, SearchOrchestrator};
pub use traits::{
    AvailabilityLookup, LocalityProvider, ProductLookup, SearchObserver, SearchTransport,
};
