use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::{token::generate_session_token, IdentityProvider};
use crate::error::{PortalError, Result};
use crate::models::PortalSession;
use crate::storage::Storage;

/// Result of a successful portal login
#[derive(Debug, Clone, Serialize)]
pub struct LoginOutcome {
    /// opaque portal session token
    pub token: String,
    /// identity the session belongs to
    pub identity_id: String,
    /// session expiry
    pub expires_at: chrono::DateTime<Utc>,
}

/// Portal session service.
///
/// Verifies credentials against the identity provider, mints opaque session
/// tokens and resolves bearer tokens back to sessions on every request.
pub struct SessionService {
    storage: Arc<dyn Storage>,
    provider: Arc<dyn IdentityProvider>,
    expiry_hours: i64,
}

impl SessionService {
    /// Create a new session service with the given dependencies
    pub fn new(
        storage: Arc<dyn Storage>,
        provider: Arc<dyn IdentityProvider>,
        expiry_hours: i64,
    ) -> Self {
        Self {
            storage,
            provider,
            expiry_hours,
        }
    }

    /// Log in with email and password, minting a portal session
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        let provider_session = self.provider.verify_credential(email, password).await?;
        let identity = provider_session.identity.clone();

        // An identity without an active profile cannot use the portal. The
        // response deliberately does not reveal which part failed.
        match self.storage.get_profile(&identity.id).await? {
            Some(profile) if profile.is_active => {}
            _ => {
                debug!("Login rejected for {}: missing or inactive profile", email);
                return Err(PortalError::InvalidCredential(
                    "Invalid login credentials".to_string(),
                ));
            }
        }

        let now = Utc::now();
        let session = PortalSession {
            token: generate_session_token(),
            identity_id: identity.id.clone(),
            email: email.to_string(),
            provider_token: provider_session.access_token,
            created_at: now,
            expires_at: now + Duration::hours(self.expiry_hours),
        };

        self.storage.create_session(&session).await?;
        info!("Portal session created for identity {}", identity.id);

        Ok(LoginOutcome {
            token: session.token,
            identity_id: identity.id,
            expires_at: session.expires_at,
        })
    }

    /// Resolve a bearer token to its portal session
    pub async fn authenticate(&self, token: &str) -> Result<PortalSession> {
        let session = self
            .storage
            .get_session(token)
            .await?
            .ok_or_else(|| {
                PortalError::InvalidCredential("Invalid or expired session token".to_string())
            })?;

        if session.is_expired() {
            self.storage.delete_session(token).await?;
            return Err(PortalError::InvalidCredential(
                "Invalid or expired session token".to_string(),
            ));
        }

        Ok(session)
    }

    /// Delete the session behind a bearer token
    pub async fn logout(&self, token: &str) -> Result<()> {
        self.storage.delete_session(token).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryIdentityProvider;
    use crate::models::{Profile, Role};
    use crate::storage::memory::MemoryStorage;

    async fn fixture() -> (SessionService, Arc<MemoryStorage>, Arc<MemoryIdentityProvider>) {
        let storage = Arc::new(MemoryStorage::new());
        let provider = Arc::new(MemoryIdentityProvider::new());
        let service = SessionService::new(storage.clone(), provider.clone(), 24);
        (service, storage, provider)
    }

    async fn register(
        storage: &MemoryStorage,
        provider: &MemoryIdentityProvider,
        email: &str,
        password: &str,
    ) -> String {
        let identity = provider.create_identity(email, password).await.unwrap();
        storage
            .insert_profile(&Profile::new(
                &identity.id,
                email,
                email.split('@').next().unwrap(),
                Role::Client,
            ))
            .await
            .unwrap();
        identity.id
    }

    #[tokio::test]
    async fn login_mints_resolvable_session() {
        let (service, storage, provider) = fixture().await;
        let identity_id = register(&storage, &provider, "cliente@test.com", "temporal1").await;

        let outcome = service.login("cliente@test.com", "temporal1").await.unwrap();
        assert_eq!(outcome.identity_id, identity_id);

        let session = service.authenticate(&outcome.token).await.unwrap();
        assert_eq!(session.identity_id, identity_id);
        assert_eq!(session.email, "cliente@test.com");
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credential() {
        let (service, storage, provider) = fixture().await;
        register(&storage, &provider, "cliente@test.com", "temporal1").await;

        let err = service
            .login("cliente@test.com", "wrongpass")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn inactive_profile_cannot_log_in() {
        let (service, storage, provider) = fixture().await;
        let identity_id = register(&storage, &provider, "cliente@test.com", "temporal1").await;
        storage.set_profile_active(&identity_id, false).await.unwrap();

        let err = service
            .login("cliente@test.com", "temporal1")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::InvalidCredential(_)));
    }

    #[tokio::test]
    async fn logout_invalidates_the_token() {
        let (service, storage, provider) = fixture().await;
        register(&storage, &provider, "cliente@test.com", "temporal1").await;

        let outcome = service.login("cliente@test.com", "temporal1").await.unwrap();
        service.logout(&outcome.token).await.unwrap();

        assert!(service.authenticate(&outcome.token).await.is_err());
    }
}
