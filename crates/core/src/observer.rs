use crate::traits::SearchObserver;
use crate::SearchError;
use tracing::warn;

/// Default observer: one structured warning per downgraded failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_failure(&self, error: &SearchError) {
        let kind = if error.is_application() {
            "application"
        } else if error.is_transport() {
            "transport"
        } else {
            "other"
        };
        warn!(kind, error = %error, "search failed; returning empty result");
    }
}
