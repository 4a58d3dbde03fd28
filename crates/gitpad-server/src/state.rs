//! Shared server state.

use gitpad_store::FileStore;
use std::sync::Arc;

/// State shared by all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Document store backing every endpoint.
    pub store: Arc<FileStore>,
}

impl AppState {
    /// Create state around an open store.
    pub fn new(store: FileStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}
