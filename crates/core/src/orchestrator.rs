use crate::controller::RequestController;
use crate::debounce::DebounceScheduler;
use crate::interpreter::ResponseInterpreter;
use crate::normalizer::ParamNormalizer;
use crate::observer::TracingObserver;
use crate::traits::{LocalityProvider, SearchObserver, SearchTransport};
use crate::{
    FixedLocality, QueryIntent, SearchConfig, SearchError, SearchResult, Suggestion,
};
use std::sync::Arc;
use tracing::debug;

/// Session-scoped entry point for product search.
///
/// Construct one per caller context (a search box, a listing page) and share
/// it by reference or `Arc`. Each instance owns one debounce timer and one
/// in-flight search; autocomplete has its own in-flight slot.
pub struct SearchOrchestrator<T>
where
    T: SearchTransport,
{
    pipeline: Arc<Pipeline<T>>,
    debounce: DebounceScheduler,
}

struct Pipeline<T> {
    transport: T,
    normalizer: ParamNormalizer,
    interpreter: ResponseInterpreter,
    searches: RequestController,
    suggestions: RequestController,
    observer: Arc<dyn SearchObserver + Send + Sync>,
    config: SearchConfig,
}

pub struct OrchestratorBuilder<T> {
    transport: T,
    config: SearchConfig,
    locality: Option<Arc<dyn LocalityProvider + Send + Sync>>,
    observer: Option<Arc<dyn SearchObserver + Send + Sync>>,
}

impl<T> OrchestratorBuilder<T>
where
    T: SearchTransport + Send + Sync + 'static,
{
    pub fn locality(mut self, locality: Arc<dyn LocalityProvider + Send + Sync>) -> Self {
        self.locality = Some(locality);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn SearchObserver + Send + Sync>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn build(self) -> SearchOrchestrator<T> {
        let locality = self
            .locality
            .unwrap_or_else(|| Arc::new(FixedLocality(self.config.defaults.fallback_locality)));
        let debounce =
            DebounceScheduler::new(self.config.debounce_delay, self.config.min_query_chars);

        SearchOrchestrator {
            pipeline: Arc::new(Pipeline {
                transport: self.transport,
                normalizer: ParamNormalizer::new(self.config.defaults.clone(), locality),
                interpreter: ResponseInterpreter,
                searches: RequestController::new(),
                suggestions: RequestController::new(),
                observer: self.observer.unwrap_or_else(|| Arc::new(TracingObserver)),
                config: self.config,
            }),
            debounce,
        }
    }
}

impl<T> SearchOrchestrator<T>
where
    T: SearchTransport + Send + Sync + 'static,
{
    pub fn new(transport: T, config: SearchConfig) -> Self {
        Self::builder(transport, config).build()
    }

    pub fn builder(transport: T, config: SearchConfig) -> OrchestratorBuilder<T> {
        OrchestratorBuilder {
            transport,
            config,
            locality: None,
            observer: None,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.pipeline.config
    }

    pub fn current_locality(&self) -> u32 {
        self.pipeline.normalizer.current_locality()
    }

    /// Runs a search, superseding any search still in flight.
    ///
    /// `None` means this call was superseded or cancelled. Failures come back
    /// as an empty result after being reported to the observer.
    pub async fn search(&self, intent: QueryIntent) -> Option<SearchResult> {
        self.pipeline.search(&intent).await
    }

    /// Like [`Self::search`] but hands back the classified failure.
    pub async fn try_search(&self, intent: QueryIntent) -> Result<SearchResult, SearchError> {
        self.pipeline.try_search(&intent).await
    }

    /// Search-box entry point: waits for a quiet period, then searches for
    /// `term` and passes the result to `on_result`.
    ///
    /// Short or absent terms call `on_result` with an empty result right away.
    /// Superseded searches never reach `on_result`.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn search_with_debounce<C>(&self, term: Option<&str>, on_result: C)
    where
        C: FnOnce(SearchResult) + Send + 'static,
    {
        let pipeline = Arc::clone(&self.pipeline);
        self.debounce.schedule(
            term,
            move |term| async move { pipeline.search(&QueryIntent::for_term(term)).await },
            on_result,
        );
    }

    /// Drops the pending debounce timer and aborts the in-flight search.
    pub fn cancel_search(&self) {
        self.debounce.clear();
        self.pipeline.searches.cancel();
    }

    /// Suggestions for a partial term. `None` when superseded by a newer request.
    pub async fn autocomplete(&self, term: &str) -> Option<Vec<Suggestion>> {
        match self.try_autocomplete(term).await {
            Ok(suggestions) => Some(suggestions),
            Err(SearchError::Cancelled) => None,
            Err(error) => {
                self.pipeline.observer.on_failure(&error);
                Some(Vec::new())
            }
        }
    }

    pub async fn try_autocomplete(&self, term: &str) -> Result<Vec<Suggestion>, SearchError> {
        let pipeline = &self.pipeline;
        if !pipeline.config.accepts_term(Some(term)) {
            return Ok(Vec::new());
        }

        let raw = pipeline
            .suggestions
            .execute(|| pipeline.transport.fetch_autocomplete(term))
            .await?;
        pipeline.interpreter.interpret_suggestions(&raw)
    }

    /// Cancels everything this instance has pending.
    pub fn dispose(&self) {
        self.cancel_search();
        self.pipeline.suggestions.cancel();
    }
}

impl<T> Pipeline<T>
where
    T: SearchTransport + Send + Sync,
{
    async fn search(&self, intent: &QueryIntent) -> Option<SearchResult> {
        match self.try_search(intent).await {
            Ok(result) => Some(result),
            Err(SearchError::Cancelled) => {
                debug!("search superseded");
                None
            }
            Err(error) => {
                self.observer.on_failure(&error);
                Some(SearchResult::empty())
            }
        }
    }

    async fn try_search(&self, intent: &QueryIntent) -> Result<SearchResult, SearchError> {
        let query = self.normalizer.normalize(intent);
        debug!(query = %query.to_query_string(), "issuing search");

        let raw = self
            .searches
            .execute(|| self.transport.fetch_search(&query))
            .await?;
        self.interpreter.interpret(&raw)
    }
}
