use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::IdentityProvider;
use crate::error::{PortalError, Result};
use crate::models::{ClientRecord, Profile, Role};
use crate::storage::{Storage, StorageError};
use crate::utils::helpers::derive_username;
use crate::validation::{validate_email, validate_temp_password};

/// Result of a successful provisioning run
#[derive(Debug, Clone, Serialize)]
pub struct ProvisionedClient {
    /// generated client record id
    pub client_id: u64,
    /// identity id at the authentication provider
    pub identity_id: String,
    /// derived portal username
    pub username: String,
    /// email the account was created with
    pub email: String,
}

/// Client provisioning workflow.
///
/// Creates the Identity → Profile → Client chain in strict order. A step only
/// runs once the previous step's success is confirmed, and a failure aborts
/// the remaining steps without rolling back the ones already done: an
/// identity left without its profile/client chain is reported to the
/// administrator and cleaned up out of band.
pub struct ProvisioningService {
    storage: Arc<dyn Storage>,
    provider: Arc<dyn IdentityProvider>,
}

impl ProvisioningService {
    /// Create a new provisioning service with the given dependencies
    pub fn new(storage: Arc<dyn Storage>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { storage, provider }
    }

    /// Provision a client account from an email and a temporary password
    pub async fn provision_client(
        &self,
        email: &str,
        temp_password: &str,
    ) -> Result<ProvisionedClient> {
        // Local validation before any remote call
        if !validate_email(email) {
            return Err(PortalError::Validation(format!(
                "Invalid email address: {}",
                email
            )));
        }
        validate_temp_password(temp_password).map_err(PortalError::WeakCredential)?;

        // Step 1: create the identity at the authentication provider
        let identity = self.provider.create_identity(email, temp_password).await?;
        info!("Provisioning: identity {} created for {}", identity.id, email);

        // Step 2: insert the account profile. From here on a failure leaves
        // an orphaned identity behind; the error says which step broke so an
        // operator can clean up manually.
        let username = derive_username(email);
        let profile = Profile::new(&identity.id, email, &username, Role::Client);

        if let Err(err) = self.storage.insert_profile(&profile).await {
            warn!(
                "Provisioning: identity {} created but profile insert failed: {}",
                identity.id, err
            );
            return Err(match err {
                StorageError::Duplicate(_) => PortalError::DuplicateUsername(format!(
                    "Username '{}' is already taken; use a different email address",
                    username
                )),
                other => PortalError::Database(format!(
                    "Identity created but profile insert failed: {}",
                    other
                )),
            });
        }

        // Step 3: insert the client record with placeholder fields
        let record = ClientRecord::admin_provisioned(&identity.id, email);
        let client_id = match self.storage.insert_client(&record).await {
            Ok(id) => id,
            Err(err) => {
                warn!(
                    "Provisioning: profile for identity {} created but client insert failed: {}",
                    identity.id, err
                );
                return Err(PortalError::Database(format!(
                    "Profile created but client insert failed: {}",
                    err
                )));
            }
        };

        info!(
            "Provisioning complete: client {} (identity {}, username {})",
            client_id, identity.id, username
        );

        Ok(ProvisionedClient {
            client_id,
            identity_id: identity.id,
            username,
            email: email.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryIdentityProvider;
    use crate::storage::memory::MemoryStorage;

    fn service() -> (ProvisioningService, Arc<MemoryStorage>, Arc<MemoryIdentityProvider>) {
        let storage = Arc::new(MemoryStorage::new());
        let provider = Arc::new(MemoryIdentityProvider::new());
        let service = ProvisioningService::new(storage.clone(), provider.clone());
        (service, storage, provider)
    }

    #[tokio::test]
    async fn full_chain_yields_client_with_placeholders() {
        let (service, storage, _) = service();

        let provisioned = service
            .provision_client("cliente@test.com", "temporal1")
            .await
            .unwrap();

        assert_eq!(provisioned.username, "cliente");

        let record = storage
            .get_client_by_identity(&provisioned.identity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.id, provisioned.client_id);
        assert_eq!(record.full_name, "cliente@test.com");
        assert!(record.passport_number.starts_with("TEMP-"));
        assert!(record.created_by_admin);
        assert!(!record.first_login_completed);
        assert!(!record.has_completed_form);

        let profile = storage
            .get_profile(&provisioned.identity_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(profile.role, Role::Client);
        assert!(profile.is_active);
    }

    #[tokio::test]
    async fn resubmitting_same_email_is_already_registered() {
        let (service, storage, _) = service();

        service
            .provision_client("cliente@test.com", "temporal1")
            .await
            .unwrap();
        let err = service
            .provision_client("cliente@test.com", "temporal1")
            .await
            .unwrap_err();

        assert!(matches!(err, PortalError::AlreadyRegistered(_)));
        // No further writes happened: still exactly one client row
        assert_eq!(storage.list_clients(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn short_temp_password_is_rejected_locally() {
        let (service, _, provider) = service();

        let err = service
            .provision_client("cliente@test.com", "abc12")
            .await
            .unwrap_err();

        assert!(matches!(err, PortalError::WeakCredential(_)));
        // The provider never saw the email
        assert!(provider.password_of("cliente@test.com").await.is_none());
    }

    #[tokio::test]
    async fn username_collision_surfaces_duplicate_username() {
        let (service, _, _) = service();

        service
            .provision_client("maria@one.com", "temporal1")
            .await
            .unwrap();
        let err = service
            .provision_client("maria@two.com", "temporal1")
            .await
            .unwrap_err();

        match err {
            PortalError::DuplicateUsername(msg) => {
                assert!(msg.contains("different email"));
            }
            other => panic!("expected DuplicateUsername, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn malformed_email_is_rejected_before_any_call() {
        let (service, _, _) = service();
        let err = service
            .provision_client("not-an-email", "temporal1")
            .await
            .unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }
}
