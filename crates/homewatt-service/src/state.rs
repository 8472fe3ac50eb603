//! Application state shared across handlers.

use std::sync::Arc;

use homewatt_store::Store;
use tokio::sync::{Mutex, RwLock};

use crate::config::Config;

/// Shared application state.
pub struct AppState {
    /// The data store (wrapped in Mutex for thread-safe access).
    pub store: Mutex<Store>,
    /// Configuration (RwLock for runtime updates).
    pub config: RwLock<Config>,
}

impl AppState {
    /// Create new application state.
    pub fn new(store: Store, config: Config) -> Arc<Self> {
        Arc::new(Self {
            store: Mutex::new(store),
            config: RwLock::new(config),
        })
    }

    /// Electricity rate applied when a request does not name one.
    pub async fn default_rate(&self) -> f64 {
        self.config.read().await.pricing.rate
    }
}
