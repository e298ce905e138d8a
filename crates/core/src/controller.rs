//! At-most-one-in-flight request handling.
//!
//! Each [`RequestController`] owns a single slot. Starting a call cancels the
//! token already in the slot before installing a new one, and a call whose
//! slot entry was replaced or cleared resolves to [`SearchError::Cancelled`]
//! even when the network answered.

use crate::SearchError;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::debug;

struct InFlight {
    generation: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct Slot {
    next_generation: u64,
    current: Option<InFlight>,
}

/// Releases the slot when an `execute` future is dropped before it settles.
struct Abandoned<'a> {
    controller: &'a RequestController,
    generation: u64,
    armed: bool,
}

impl Drop for Abandoned<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut slot = self.controller.lock();
        if slot
            .current
            .as_ref()
            .is_some_and(|live| live.generation == self.generation)
        {
            if let Some(live) = slot.current.take() {
                live.token.cancel();
            }
        }
    }
}

#[derive(Default)]
pub struct RequestController {
    slot: Mutex<Slot>,
}

impl RequestController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `call` as the only live request, superseding any previous one.
    pub async fn execute<T, F, Fut>(&self, call: F) -> Result<T, SearchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        let (generation, token) = self.begin();
        let mut abandoned = Abandoned {
            controller: self,
            generation,
            armed: true,
        };

        let outcome = tokio::select! {
            biased;
            _ = token.cancelled() => Err(SearchError::Cancelled),
            outcome = call() => outcome,
        };

        abandoned.armed = false;
        self.finish(generation, outcome)
    }

    /// Cancels the live request, if any. Safe to call repeatedly.
    pub fn cancel(&self) {
        if let Some(previous) = self.lock().current.take() {
            debug!(generation = previous.generation, "cancelling in-flight request");
            previous.token.cancel();
        }
    }

    pub fn is_in_flight(&self) -> bool {
        self.lock().current.is_some()
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut slot = self.lock();
        if let Some(previous) = slot.current.take() {
            debug!(generation = previous.generation, "superseding in-flight request");
            previous.token.cancel();
        }

        slot.next_generation += 1;
        let generation = slot.next_generation;
        let token = CancellationToken::new();
        slot.current = Some(InFlight {
            generation,
            token: token.clone(),
        });
        (generation, token)
    }

    fn finish<T>(&self, generation: u64, outcome: Result<T, SearchError>) -> Result<T, SearchError> {
        let mut slot = self.lock();
        match &slot.current {
            Some(live) if live.generation == generation => {
                slot.current = None;
                outcome
            }
            _ => {
                debug!(generation, "discarding stale completion");
                Err(SearchError::Cancelled)
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
