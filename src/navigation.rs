//! Page navigation seam.

use std::sync::Mutex;

/// Fire-and-forget redirect to an application path.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

/// Navigator that logs each redirect and remembers where it went.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    visited: Mutex<Vec<String>>,
}

impl HistoryNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every path navigated to, oldest first.
    pub fn visited(&self) -> Vec<String> {
        match self.visited.lock() {
            Ok(v) => v.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<String> {
        self.visited().pop()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, path: &str) {
        tracing::info!(path = %path, "Navigating");
        match self.visited.lock() {
            Ok(mut v) => v.push(path.to_string()),
            Err(poisoned) => poisoned.into_inner().push(path.to_string()),
        }
    }
}
