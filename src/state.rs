use anyhow::Result;
use ecoeventos_core::EventStore;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    // The store re-reads the JSON file on every call, so sharing one
    // instance across requests caches nothing.
    store: Arc<EventStore>,
}

impl AppState {
    pub fn new(store: EventStore) -> Self {
        AppState {
            store: Arc::new(store),
        }
    }

    /// Run a store call on the blocking pool. Store calls do file I/O and may
    /// wait for the file lock.
    pub async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&EventStore) -> T + Send + 'static,
        T: Send + 'static,
    {
        let store = Arc::clone(&self.store);
        Ok(tokio::task::spawn_blocking(move || f(&store)).await?)
    }
}
