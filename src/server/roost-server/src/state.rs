//! Shared application state.

use std::sync::Arc;

use roost_keyring::ApiKeyService;

/// State handed to every management handler.
#[derive(Clone)]
pub struct AppState {
    /// The key lifecycle service.
    pub keyring: Arc<ApiKeyService>,
}

impl AppState {
    /// Wraps a keyring service as router state.
    pub fn new(keyring: Arc<ApiKeyService>) -> Self {
        Self { keyring }
    }
}
