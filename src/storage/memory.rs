use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex as TokioMutex;

use crate::models::{ClientFormData, ClientRecord, PortalSession, Profile};
use crate::storage::{Result, Storage, StorageError};

// In-memory storage data structure (using Mutex for thread safety)
struct StorageData {
    profiles: HashMap<String, Profile>,      // identity_id -> profile
    clients: HashMap<u64, ClientRecord>,     // client_id -> record
    sessions: HashMap<String, PortalSession>, // token -> session
    next_client_id: u64,                     // auto-increment counter
}

impl StorageData {
    fn new() -> Self {
        Self {
            profiles: HashMap::new(),
            clients: HashMap::new(),
            sessions: HashMap::new(),
            next_client_id: 1,
        }
    }
}

/// In-memory storage implementation (useful for testing)
pub struct MemoryStorage {
    data: TokioMutex<StorageData>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            data: TokioMutex::new(StorageData::new()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<()> {
        let mut data = self.data.lock().await;

        if data.profiles.contains_key(&profile.identity_id) {
            return Err(StorageError::Duplicate(format!(
                "Profile already exists for identity {}",
                profile.identity_id
            )));
        }
        if data
            .profiles
            .values()
            .any(|p| p.username == profile.username)
        {
            return Err(StorageError::Duplicate(format!(
                "Duplicate entry '{}' for key 'uq_profiles_username'",
                profile.username
            )));
        }

        data.profiles
            .insert(profile.identity_id.clone(), profile.clone());
        Ok(())
    }

    async fn get_profile(&self, identity_id: &str) -> Result<Option<Profile>> {
        let data = self.data.lock().await;
        Ok(data.profiles.get(identity_id).cloned())
    }

    async fn set_profile_active(&self, identity_id: &str, active: bool) -> Result<()> {
        let mut data = self.data.lock().await;
        match data.profiles.get_mut(identity_id) {
            Some(profile) => {
                profile.is_active = active;
                profile.updated_at = Utc::now();
                Ok(())
            }
            None => Err(StorageError::NotFound(format!(
                "No profile for identity {}",
                identity_id
            ))),
        }
    }

    async fn insert_client(&self, client: &ClientRecord) -> Result<u64> {
        let mut data = self.data.lock().await;

        if data
            .clients
            .values()
            .any(|c| c.identity_id == client.identity_id)
        {
            return Err(StorageError::Duplicate(format!(
                "Client record already exists for identity {}",
                client.identity_id
            )));
        }

        let client_id = data.next_client_id;
        data.next_client_id += 1;

        let mut stored = client.clone();
        stored.id = client_id;
        data.clients.insert(client_id, stored);

        Ok(client_id)
    }

    async fn get_client_by_identity(&self, identity_id: &str) -> Result<Option<ClientRecord>> {
        let data = self.data.lock().await;
        Ok(data
            .clients
            .values()
            .find(|c| c.identity_id == identity_id)
            .cloned())
    }

    async fn get_client_by_id(&self, client_id: u64) -> Result<Option<ClientRecord>> {
        let data = self.data.lock().await;
        Ok(data.clients.get(&client_id).cloned())
    }

    async fn list_clients(&self, limit: u32) -> Result<Vec<ClientRecord>> {
        let data = self.data.lock().await;
        let mut clients: Vec<ClientRecord> = data.clients.values().cloned().collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        clients.truncate(limit as usize);
        Ok(clients)
    }

    async fn update_client_form(&self, identity_id: &str, form: &ClientFormData) -> Result<()> {
        let mut data = self.data.lock().await;

        let client = data
            .clients
            .values_mut()
            .find(|c| c.identity_id == identity_id)
            .ok_or_else(|| {
                StorageError::NotFound(format!("No client record for identity {}", identity_id))
            })?;

        client.full_name = form.full_name.clone();
        client.passport_number = form.passport_number.clone();
        client.date_of_birth = form.date_of_birth;
        client.phone = form.phone.clone();
        client.current_job = form.current_job.clone();
        client.agency = form.agency.clone();
        client.has_completed_form = true;
        client.updated_at = Utc::now();

        Ok(())
    }

    async fn set_first_login_completed(&self, identity_id: &str) -> Result<()> {
        let mut data = self.data.lock().await;

        let client = data
            .clients
            .values_mut()
            .find(|c| c.identity_id == identity_id)
            .ok_or_else(|| {
                StorageError::NotFound(format!("No client record for identity {}", identity_id))
            })?;

        client.first_login_completed = true;
        client.updated_at = Utc::now();

        Ok(())
    }

    async fn create_session(&self, session: &PortalSession) -> Result<()> {
        let mut data = self.data.lock().await;
        data.sessions
            .insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<PortalSession>> {
        let data = self.data.lock().await;
        Ok(data.sessions.get(token).cloned())
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        let mut data = self.data.lock().await;
        data.sessions.remove(token);
        Ok(())
    }

    async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let mut data = self.data.lock().await;
        let now = Utc::now();
        let before = data.sessions.len();
        data.sessions.retain(|_, s| s.expires_at > now);
        Ok((before - data.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[tokio::test]
    async fn insert_client_assigns_incrementing_ids() {
        let storage = MemoryStorage::new();

        let a = storage
            .insert_client(&ClientRecord::admin_provisioned("id-a", "a@test.com"))
            .await
            .unwrap();
        let b = storage
            .insert_client(&ClientRecord::admin_provisioned("id-b", "b@test.com"))
            .await
            .unwrap();

        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(storage.get_client_by_id(a).await.unwrap().unwrap().id, a);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let storage = MemoryStorage::new();
        storage
            .insert_profile(&Profile::new("id-a", "maria@one.com", "maria", Role::Client))
            .await
            .unwrap();

        let err = storage
            .insert_profile(&Profile::new("id-b", "maria@two.com", "maria", Role::Client))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Duplicate(_)));
    }

    #[tokio::test]
    async fn update_client_form_requires_existing_record() {
        let storage = MemoryStorage::new();
        let form = ClientFormData {
            full_name: "Maria Lopez".to_string(),
            passport_number: "X1234567".to_string(),
            date_of_birth: chrono::NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            phone: "600111222".to_string(),
            current_job: "Nurse".to_string(),
            agency: None,
        };

        let err = storage.update_client_form("missing", &form).await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }
}
