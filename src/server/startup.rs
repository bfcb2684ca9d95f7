use std::sync::Arc;
use tracing::{error, info};

use crate::auth::IdentityProvider;
use crate::config::settings::Config;
use crate::error::Result;
use crate::server::app_state::AppState;
use crate::server::http::run_http_server;
use crate::storage::Storage;

/// Start the server with injected storage and identity provider
pub async fn start_server_with_dependencies(
    config: Config,
    storage: Arc<dyn Storage>,
    provider: Arc<dyn IdentityProvider>,
) -> Result<()> {
    let state = Arc::new(AppState::new(config, storage, provider)?);

    // Drop sessions that expired while the server was down
    match state.storage.cleanup_expired_sessions().await {
        Ok(0) => {}
        Ok(n) => info!("Removed {} expired portal sessions", n),
        Err(e) => error!("Expired-session cleanup failed: {}", e),
    }

    run_http_server(state).await
}
