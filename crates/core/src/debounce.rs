//! Last-call-wins scheduling of search intents.

use crate::SearchResult;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

#[derive(Default)]
struct Pending {
    epoch: u64,
    handle: Option<JoinHandle<()>>,
}

impl Pending {
    fn clear(&mut self) {
        self.epoch += 1;
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

/// Holds at most one timer. Scheduling again aborts the previous timer, along
/// with a search it may already have started.
pub struct DebounceScheduler {
    delay: Duration,
    min_query_chars: usize,
    pending: Arc<Mutex<Pending>>,
}

impl DebounceScheduler {
    pub fn new(delay: Duration, min_query_chars: usize) -> Self {
        Self {
            delay,
            min_query_chars,
            pending: Arc::new(Mutex::new(Pending::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `search(term)` once the quiet period elapses and passes its result
    /// to `on_result`. A `None` from `search` means the call was superseded and
    /// `on_result` is skipped.
    ///
    /// Terms shorter than the minimum length call `on_result` with an empty
    /// result before returning, without touching the network.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<S, Fut, C>(&self, term: Option<&str>, search: S, on_result: C)
    where
        S: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = Option<SearchResult>> + Send + 'static,
        C: FnOnce(SearchResult) + Send + 'static,
    {
        let mut pending = lock(&self.pending);
        pending.clear();

        let term = match term.filter(|term| term.chars().count() >= self.min_query_chars) {
            Some(term) => term.to_string(),
            None => {
                drop(pending);
                on_result(SearchResult::empty());
                return;
            }
        };

        let epoch = pending.epoch;
        let delay = self.delay;
        let shared = Arc::clone(&self.pending);
        pending.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            debug!(epoch, term = %term, "debounce window elapsed");

            let Some(result) = search(term).await else {
                return;
            };

            {
                let mut pending = lock(&shared);
                if pending.epoch != epoch {
                    return;
                }
                pending.handle = None;
            }
            on_result(result);
        }));
    }

    /// Drops the pending timer, if any.
    pub fn clear(&self) {
        lock(&self.pending).clear();
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.pending).handle.is_some()
    }
}

impl Drop for DebounceScheduler {
    fn drop(&mut self) {
        self.clear();
    }
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
