use async_trait::async_trait;
use mysql_async::prelude::Queryable;
use mysql_async::{Opts, Pool};
use tracing::{debug, info};

use crate::models::{ClientFormData, ClientRecord, PortalSession, Profile};
use crate::storage::{Result, Storage, StorageError};
use crate::storage::mysql_client::MySqlClientExt;
use crate::storage::mysql_profile::MySqlProfileExt;
use crate::storage::mysql_session::MySqlSessionExt;

// MySQL error code for duplicate-key violations
const ER_DUP_ENTRY: u16 = 1062;

/// MySQL storage implementation
pub struct MySqlStorage {
    pool: Pool,
}

impl MySqlStorage {
    /// Create new storage from a connection URL
    pub fn new(url: &str) -> Result<Self> {
        let opts = Opts::from_url(url)
            .map_err(|e| StorageError::ConfigurationError(format!("Invalid MySQL URL: {}", e)))?;

        Ok(Self {
            pool: Pool::new(opts),
        })
    }

    /// Get the underlying connection pool
    pub fn get_pool(&self) -> &Pool {
        &self.pool
    }

    /// Create the schema if it does not exist yet
    pub async fn init_schema(&self) -> Result<()> {
        let mut conn = self.pool.get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.query_drop(
            r"CREATE TABLE IF NOT EXISTS profiles (
                identity_id VARCHAR(64) PRIMARY KEY,
                email VARCHAR(255) NOT NULL,
                username VARCHAR(255) NOT NULL,
                role VARCHAR(16) NOT NULL,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL,
                UNIQUE KEY uq_profiles_username (username)
            )",
        )
        .await
        .map_err(|e| StorageError::Database(format!("Failed to create profiles table: {}", e)))?;

        conn.query_drop(
            r"CREATE TABLE IF NOT EXISTS clients (
                id BIGINT UNSIGNED AUTO_INCREMENT PRIMARY KEY,
                identity_id VARCHAR(64) NOT NULL,
                email VARCHAR(255) NOT NULL,
                full_name VARCHAR(255) NOT NULL,
                passport_number VARCHAR(64) NOT NULL,
                date_of_birth DATE NOT NULL,
                phone VARCHAR(32) NOT NULL,
                current_job VARCHAR(255) NOT NULL DEFAULT '',
                agency VARCHAR(255) NULL,
                has_completed_form BOOLEAN NOT NULL DEFAULT FALSE,
                created_by_admin BOOLEAN NOT NULL DEFAULT FALSE,
                first_login_completed BOOLEAN NOT NULL DEFAULT FALSE,
                created_at BIGINT NOT NULL,
                updated_at BIGINT NOT NULL,
                UNIQUE KEY uq_clients_identity (identity_id)
            )",
        )
        .await
        .map_err(|e| StorageError::Database(format!("Failed to create clients table: {}", e)))?;

        conn.query_drop(
            r"CREATE TABLE IF NOT EXISTS portal_sessions (
                token VARCHAR(64) PRIMARY KEY,
                identity_id VARCHAR(64) NOT NULL,
                email VARCHAR(255) NOT NULL,
                provider_token TEXT NOT NULL,
                created_at BIGINT NOT NULL,
                expires_at BIGINT NOT NULL,
                KEY idx_sessions_identity (identity_id)
            )",
        )
        .await
        .map_err(|e| StorageError::Database(format!("Failed to create sessions table: {}", e)))?;

        info!("Database schema initialized");
        Ok(())
    }
}

/// Map a mysql_async error, detecting duplicate-key violations
pub(crate) fn map_mysql_error(context: &str, err: mysql_async::Error) -> StorageError {
    if let mysql_async::Error::Server(ref server_err) = err {
        if server_err.code == ER_DUP_ENTRY {
            return StorageError::Duplicate(format!("{}: {}", context, server_err.message));
        }
    }
    StorageError::Database(format!("{}: {}", context, err))
}

#[async_trait]
impl Storage for MySqlStorage {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn health_check(&self) -> Result<bool> {
        let mut conn = self.pool.get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.query_first::<u8, _>("SELECT 1")
            .await
            .map_err(|e| StorageError::Database(format!("Health check query failed: {}", e)))?;

        debug!("MySQL health check passed");
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        self.pool
            .clone()
            .disconnect()
            .await
            .map_err(|e| StorageError::Connection(format!("Failed to disconnect pool: {}", e)))
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        MySqlProfileExt::insert_profile(self, profile).await
    }

    async fn get_profile(&self, identity_id: &str) -> Result<Option<Profile>> {
        MySqlProfileExt::get_profile(self, identity_id).await
    }

    async fn set_profile_active(&self, identity_id: &str, active: bool) -> Result<()> {
        MySqlProfileExt::set_profile_active(self, identity_id, active).await
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<u64> {
        MySqlClientExt::insert_client(self, client).await
    }

    async fn get_client_by_identity(&self, identity_id: &str) -> Result<Option<ClientRecord>> {
        MySqlClientExt::get_client_by_identity(self, identity_id).await
    }

    async fn get_client_by_id(&self, client_id: u64) -> Result<Option<ClientRecord>> {
        MySqlClientExt::get_client_by_id(self, client_id).await
    }

    async fn list_clients(&self, limit: u32) -> Result<Vec<ClientRecord>> {
        MySqlClientExt::list_clients(self, limit).await
    }

    async fn update_client_form(&self, identity_id: &str, form: &ClientFormData) -> Result<()> {
        MySqlClientExt::update_client_form(self, identity_id, form).await
    }

    async fn set_first_login_completed(&self, identity_id: &str) -> Result<()> {
        MySqlClientExt::set_first_login_completed(self, identity_id).await
    }

    async fn create_session(&self, session: &PortalSession) -> Result<()> {
        MySqlSessionExt::create_session(self, session).await
    }

    async fn get_session(&self, token: &str) -> Result<Option<PortalSession>> {
        MySqlSessionExt::get_session(self, token).await
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        MySqlSessionExt::delete_session(self, token).await
    }

    async fn cleanup_expired_sessions(&self) -> Result<u64> {
        MySqlSessionExt::cleanup_expired_sessions(self).await
    }
}
