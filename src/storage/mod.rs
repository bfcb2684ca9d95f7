pub mod mysql;
pub mod memory;

// MySQL per-entity extension traits
mod mysql_profile;
mod mysql_client;
mod mysql_session;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::config::settings::DatabaseConfig;
use crate::error::{PortalError, Result as AppResult};
use crate::models::{ClientFormData, ClientRecord, PortalSession, Profile};

pub use mysql_profile::MySqlProfileExt;
pub use mysql_client::MySqlClientExt;
pub use mysql_session::MySqlSessionExt;

use self::mysql::MySqlStorage;

/// Storage Result type
pub type Result<T> = std::result::Result<T, StorageError>;

/// Error types for storage operations
#[derive(Debug, Error, Clone)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate key: {0}")]
    Duplicate(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            StorageError::Database(_) => "database",
            StorageError::Connection(_) => "connection",
            StorageError::NotFound(_) => "not_found",
            StorageError::Duplicate(_) => "duplicate",
            StorageError::InvalidData(_) => "validation",
            StorageError::ConfigurationError(_) => "config",
            StorageError::Internal(_) => "internal",
        }
    }
}

/// Profile-store boundary.
///
/// Every method is a single atomic remote operation: no retries, no
/// cross-call transactions. Composing several calls into one consistent unit
/// is the calling workflow's responsibility.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get the storage instance as Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;

    /// Health check with connection validation
    async fn health_check(&self) -> Result<bool>;

    /// Close all connections gracefully
    async fn close(&self) -> Result<()>;

    // Profile related methods
    async fn insert_profile(&self, profile: &Profile) -> Result<()>;
    async fn get_profile(&self, identity_id: &str) -> Result<Option<Profile>>;
    async fn set_profile_active(&self, identity_id: &str, active: bool) -> Result<()>;

    // Client record related methods
    /// Insert a client record and return the generated row id
    async fn insert_client(&self, client: &ClientRecord) -> Result<u64>;
    async fn get_client_by_identity(&self, identity_id: &str) -> Result<Option<ClientRecord>>;
    async fn get_client_by_id(&self, client_id: u64) -> Result<Option<ClientRecord>>;
    /// List client records, newest first
    async fn list_clients(&self, limit: u32) -> Result<Vec<ClientRecord>>;
    /// Replace the placeholder fields with the submitted form and mark the form complete
    async fn update_client_form(&self, identity_id: &str, form: &ClientFormData) -> Result<()>;
    /// Mark the forced first-login password change as finished
    async fn set_first_login_completed(&self, identity_id: &str) -> Result<()>;

    // Portal session related methods
    async fn create_session(&self, session: &PortalSession) -> Result<()>;
    async fn get_session(&self, token: &str) -> Result<Option<PortalSession>>;
    async fn delete_session(&self, token: &str) -> Result<()>;
    async fn cleanup_expired_sessions(&self) -> Result<u64>;
}

/// Storage factory
pub struct StorageFactory;

impl StorageFactory {
    /// Create MySQL storage
    pub async fn create_mysql_storage(config: &DatabaseConfig) -> AppResult<MySqlStorage> {
        info!("Creating MySQL storage");

        let storage = MySqlStorage::new(&config.url())
            .map_err(|e| PortalError::Database(format!("Failed to create MySQL storage: {}", e)))?;

        storage
            .init_schema()
            .await
            .map_err(|e| PortalError::Database(format!("Failed to initialize schema: {}", e)))?;

        info!("MySQL storage created");
        Ok(storage)
    }

    /// Create memory storage for testing
    pub fn create_memory_storage() -> memory::MemoryStorage {
        info!("Creating memory storage for testing");
        memory::MemoryStorage::new()
    }
}

/// Initialize the storage layer and verify connectivity
pub async fn init_storage(config: &DatabaseConfig) -> AppResult<Arc<dyn Storage>> {
    info!("Initializing storage layer");

    let storage = StorageFactory::create_mysql_storage(config).await?;

    storage
        .health_check()
        .await
        .map_err(|e| PortalError::Database(format!("Storage health check failed: {}", e)))?;

    info!("Storage layer initialized");
    Ok(Arc::new(storage))
}
