use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex as TokioMutex;
use uuid::Uuid;

use crate::auth::{AuthError, Identity, IdentityProvider, ProviderSession, Result};

// Registered identity state
struct IdentityEntry {
    id: String,
    password: String,
}

// In-memory provider data (Mutex for thread safety)
struct ProviderData {
    identities: HashMap<String, IdentityEntry>, // email -> entry
    tokens: HashMap<String, String>,            // access_token -> email
}

/// In-memory identity provider implementation (useful for testing).
///
/// Mirrors the hosted provider's observable behavior, including the exact
/// error phrases the classifier matches on.
pub struct MemoryIdentityProvider {
    data: TokioMutex<ProviderData>,
}

impl MemoryIdentityProvider {
    /// Create a new memory provider instance
    pub fn new() -> Self {
        Self {
            data: TokioMutex::new(ProviderData {
                identities: HashMap::new(),
                tokens: HashMap::new(),
            }),
        }
    }

    /// Current password stored for an email, for test assertions
    pub async fn password_of(&self, email: &str) -> Option<String> {
        let data = self.data.lock().await;
        data.identities.get(email).map(|e| e.password.clone())
    }
}

impl Default for MemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity> {
        let mut data = self.data.lock().await;

        if data.identities.contains_key(email) {
            return Err(AuthError::AlreadyRegistered(
                "User already registered".to_string(),
            ));
        }
        if password.len() < 6 {
            return Err(AuthError::WeakPassword(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let id = Uuid::new_v4().to_string();
        data.identities.insert(
            email.to_string(),
            IdentityEntry {
                id: id.clone(),
                password: password.to_string(),
            },
        );

        Ok(Identity {
            id,
            email: email.to_string(),
        })
    }

    async fn verify_credential(&self, email: &str, password: &str) -> Result<ProviderSession> {
        let mut data = self.data.lock().await;

        let (id, stored) = match data.identities.get(email) {
            Some(entry) => (entry.id.clone(), entry.password.clone()),
            None => {
                return Err(AuthError::InvalidCredentials(
                    "Invalid login credentials".to_string(),
                ))
            }
        };

        if stored != password {
            return Err(AuthError::InvalidCredentials(
                "Invalid login credentials".to_string(),
            ));
        }

        let access_token = Uuid::new_v4().to_string();
        data.tokens.insert(access_token.clone(), email.to_string());

        Ok(ProviderSession {
            access_token,
            token_type: "bearer".to_string(),
            identity: Identity {
                id,
                email: email.to_string(),
            },
        })
    }

    async fn update_credential(&self, access_token: &str, new_password: &str) -> Result<()> {
        let mut data = self.data.lock().await;

        let email = match data.tokens.get(access_token) {
            Some(email) => email.clone(),
            None => {
                return Err(AuthError::InvalidCredentials(
                    "Invalid login credentials".to_string(),
                ))
            }
        };

        match data.identities.get_mut(&email) {
            Some(entry) => {
                entry.password = new_password.to_string();
                Ok(())
            }
            None => Err(AuthError::Unknown(format!(
                "No identity behind token for {}",
                email
            ))),
        }
    }
}
