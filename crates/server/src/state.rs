//! Shared application state

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use stellar_config::Settings;

/// State shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    active_sessions: Arc<AtomicUsize>,
}

impl AppState {
    pub fn new(config: Settings) -> Self {
        Self {
            config: Arc::new(config),
            active_sessions: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn session_started(&self) -> usize {
        self.active_sessions.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn session_ended(&self) -> usize {
        self.active_sessions.fetch_sub(1, Ordering::Relaxed) - 1
    }

    pub fn session_count(&self) -> usize {
        self.active_sessions.load(Ordering::Relaxed)
    }
}
