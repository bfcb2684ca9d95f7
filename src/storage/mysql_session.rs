use chrono::DateTime;
use mysql_async::prelude::*;
use tracing::debug;

use crate::models::PortalSession;
use crate::storage::mysql::{map_mysql_error, MySqlStorage};
use crate::storage::{Result, StorageError};

/// Portal-session operations on the MySQL backend
pub trait MySqlSessionExt {
    async fn create_session(&self, session: &PortalSession) -> Result<()>;
    async fn get_session(&self, token: &str) -> Result<Option<PortalSession>>;
    async fn delete_session(&self, token: &str) -> Result<()>;
    async fn cleanup_expired_sessions(&self) -> Result<u64>;
}

impl MySqlSessionExt for MySqlStorage {
    async fn create_session(&self, session: &PortalSession) -> Result<()> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.exec_drop(
            r"INSERT INTO portal_sessions (
                token, identity_id, email, provider_token, created_at, expires_at
              ) VALUES (?, ?, ?, ?, ?, ?)",
            (
                &session.token,
                &session.identity_id,
                &session.email,
                &session.provider_token,
                session.created_at.timestamp(),
                session.expires_at.timestamp(),
            ),
        )
        .await
        .map_err(|e| map_mysql_error("Failed to insert session", e))?;

        debug!("Created portal session for identity {}", session.identity_id);
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<PortalSession>> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        let row: Option<(String, String, String, String, i64, i64)> = conn
            .exec_first(
                r"SELECT token, identity_id, email, provider_token, created_at, expires_at
                  FROM portal_sessions
                  WHERE token = ?",
                (token,),
            )
            .await
            .map_err(|e| StorageError::Database(format!("Failed to query session: {}", e)))?;

        match row {
            Some((token, identity_id, email, provider_token, created_at, expires_at)) => {
                let created_at = DateTime::from_timestamp(created_at, 0).ok_or_else(|| {
                    StorageError::InvalidData("Invalid created_at timestamp".to_string())
                })?;
                let expires_at = DateTime::from_timestamp(expires_at, 0).ok_or_else(|| {
                    StorageError::InvalidData("Invalid expires_at timestamp".to_string())
                })?;

                Ok(Some(PortalSession {
                    token,
                    identity_id,
                    email,
                    provider_token,
                    created_at,
                    expires_at,
                }))
            }
            None => Ok(None),
        }
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.exec_drop("DELETE FROM portal_sessions WHERE token = ?", (token,))
            .await
            .map_err(|e| StorageError::Database(format!("Failed to delete session: {}", e)))?;

        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.exec_drop(
            "DELETE FROM portal_sessions WHERE expires_at < ?",
            (chrono::Utc::now().timestamp(),),
        )
        .await
        .map_err(|e| StorageError::Database(format!("Failed to cleanup sessions: {}", e)))?;

        Ok(conn.affected_rows())
    }
}
