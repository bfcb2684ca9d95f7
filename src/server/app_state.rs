use std::sync::Arc;
use tracing::info;

use crate::auth::IdentityProvider;
use crate::config::settings::Config;
use crate::error::Result;
use crate::services::{PasswordGateService, ProvisioningService, SessionService};
use crate::storage::Storage;

/// Shared application state handed to every request handler.
///
/// All dependencies are injected explicitly at construction: the identity
/// provider handle and the store handle are created once at process start and
/// passed by reference from here on. No ambient lookup, no module-level
/// singletons.
pub struct AppState {
    pub config: Config,
    pub storage: Arc<dyn Storage>,
    pub provider: Arc<dyn IdentityProvider>,
    pub sessions: SessionService,
    pub provisioning: ProvisioningService,
    pub gate: PasswordGateService,
}

impl AppState {
    /// Build the application state from its injected dependencies
    pub fn new(
        config: Config,
        storage: Arc<dyn Storage>,
        provider: Arc<dyn IdentityProvider>,
    ) -> Result<Self> {
        let sessions = SessionService::new(
            storage.clone(),
            provider.clone(),
            config.server.session_expiry_hours,
        );
        let provisioning = ProvisioningService::new(storage.clone(), provider.clone());
        let gate = PasswordGateService::new(
            storage.clone(),
            provider.clone(),
            config.password_gate.clone(),
        );

        info!("Application state initialized");

        Ok(Self {
            config,
            storage,
            provider,
            sessions,
            provisioning,
            gate,
        })
    }
}
