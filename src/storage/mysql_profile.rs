use chrono::DateTime;
use mysql_async::prelude::*;
use tracing::debug;

use crate::models::{Profile, Role};
use crate::storage::mysql::{map_mysql_error, MySqlStorage};
use crate::storage::{Result, StorageError};

/// Profile operations on the MySQL backend
pub trait MySqlProfileExt {
    async fn insert_profile(&self, profile: &Profile) -> Result<()>;
    async fn get_profile(&self, identity_id: &str) -> Result<Option<Profile>>;
    async fn set_profile_active(&self, identity_id: &str, active: bool) -> Result<()>;
}

// Row tuple shared by the select queries
type ProfileRow = (String, String, String, String, bool, i64, i64);

fn profile_from_row(row: ProfileRow) -> Result<Profile> {
    let (identity_id, email, username, role, is_active, created_at, updated_at) = row;

    let role: Role = role
        .parse()
        .map_err(|e: String| StorageError::InvalidData(e))?;
    let created_at = DateTime::from_timestamp(created_at, 0)
        .ok_or_else(|| StorageError::InvalidData("Invalid created_at timestamp".to_string()))?;
    let updated_at = DateTime::from_timestamp(updated_at, 0)
        .ok_or_else(|| StorageError::InvalidData("Invalid updated_at timestamp".to_string()))?;

    Ok(Profile {
        identity_id,
        email,
        username,
        role,
        is_active,
        created_at,
        updated_at,
    })
}

impl MySqlProfileExt for MySqlStorage {
    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.exec_drop(
            r"INSERT INTO profiles (
                identity_id, email, username, role,
                is_active, created_at, updated_at
              ) VALUES (?, ?, ?, ?, ?, ?, ?)",
            (
                &profile.identity_id,
                &profile.email,
                &profile.username,
                profile.role.as_str(),
                profile.is_active,
                profile.created_at.timestamp(),
                profile.updated_at.timestamp(),
            ),
        )
        .await
        .map_err(|e| map_mysql_error("Failed to insert profile", e))?;

        debug!("Inserted profile for identity {}", profile.identity_id);
        Ok(())
    }

    async fn get_profile(&self, identity_id: &str) -> Result<Option<Profile>> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        let row: Option<ProfileRow> = conn
            .exec_first(
                r"SELECT identity_id, email, username, role, is_active, created_at, updated_at
                  FROM profiles
                  WHERE identity_id = ?",
                (identity_id,),
            )
            .await
            .map_err(|e| StorageError::Database(format!("Failed to query profile: {}", e)))?;

        row.map(profile_from_row).transpose()
    }

    async fn set_profile_active(&self, identity_id: &str, active: bool) -> Result<()> {
        let mut conn = self.get_pool().get_conn().await.map_err(|e| {
            StorageError::Connection(format!("Failed to get connection: {}", e))
        })?;

        conn.exec_drop(
            r"UPDATE profiles SET is_active = ?, updated_at = ? WHERE identity_id = ?",
            (active, chrono::Utc::now().timestamp(), identity_id),
        )
        .await
        .map_err(|e| StorageError::Database(format!("Failed to update profile: {}", e)))?;

        if conn.affected_rows() == 0 {
            return Err(StorageError::NotFound(format!(
                "No profile for identity {}",
                identity_id
            )));
        }

        Ok(())
    }
}
