use crate::traits::LocalityProvider;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedLocality(pub u32);

impl LocalityProvider for FixedLocality {
    fn current_locality(&self) -> Option<u32> {
        Some(self.0)
    }
}

/// A locality the user can switch mid-session. Zero means "nothing selected".
#[derive(Debug, Clone, Default)]
pub struct SharedLocality {
    current: Arc<AtomicU32>,
}

impl SharedLocality {
    pub fn new(initial: Option<u32>) -> Self {
        Self {
            current: Arc::new(AtomicU32::new(initial.unwrap_or(0))),
        }
    }

    /// Switches the session's city. City ids start at 1; `select(0)` is the
    /// same as [`Self::clear`].
    pub fn select(&self, locality: u32) {
        self.current.store(locality, Ordering::Release);
    }

    pub fn clear(&self) {
        self.current.store(0, Ordering::Release);
    }
}

impl LocalityProvider for SharedLocality {
    fn current_locality(&self) -> Option<u32> {
        match self.current.load(Ordering::Acquire) {
            0 => None,
            locality => Some(locality),
        }
    }
}
