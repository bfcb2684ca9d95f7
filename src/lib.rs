// Re-export core functionality for external use
pub use async_trait::async_trait;

// Core module definitions
pub mod config;
pub mod models;
pub mod storage;
pub mod server;
pub mod services;
pub mod handlers;
pub mod auth;
pub mod utils;
pub mod error;
pub mod validation;

// Unified error handling
pub use error::{PortalError, Result};
pub type AppResult<T> = Result<T>;

// Essential re-exports for convenience
pub use server::{app_state::AppState, startup::start_server_with_dependencies};

pub use config::settings::{Config, DatabaseConfig, ServerConfig};

// Storage abstractions
pub use storage::{init_storage, memory::MemoryStorage, mysql::MySqlStorage, Storage, StorageError};

// Model exports
pub use models::{ClientFormData, ClientRecord, PortalSession, Profile, Role};

// Identity provider adapter
pub use auth::{HttpIdentityProvider, IdentityProvider, MemoryIdentityProvider};

// Workflow services
pub use services::{
    ChangePasswordRequest, GateState, LoginOutcome, PasswordGateService, ProvisionedClient,
    ProvisioningService, SessionService,
};

// Version and build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");

// Common type aliases
pub type IdentityId = String;
pub type ClientId = u64;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        AppState, ChangePasswordRequest, ClientRecord, Config, GateState, IdentityProvider,
        PortalError, Profile, Result, Role, Storage, NAME, VERSION,
    };

    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
    pub use tracing::{debug, error, info, instrument, warn};
}
