// Common test helpers for integration tests

use std::sync::Arc;

use relo_portal_server::auth::MemoryIdentityProvider;
use relo_portal_server::config::settings::Config;
use relo_portal_server::server::app_state::AppState;
use relo_portal_server::storage::memory::MemoryStorage;

/// Build an AppState over in-memory storage and an in-memory identity provider
pub fn app_state_with_memory() -> Arc<AppState> {
    let storage = Arc::new(MemoryStorage::new());
    let provider = Arc::new(MemoryIdentityProvider::new());
    let mut config = Config::default();
    config.features.test_mode = true;

    AppState::new(config, storage, provider)
        .expect("Failed to build AppState")
        .into()
}
