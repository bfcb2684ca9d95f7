use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::IdentityProvider;
use crate::config::settings::PasswordGateConfig;
use crate::error::{PortalError, Result};
use crate::models::PortalSession;
use crate::storage::Storage;
use crate::validation::validate_password_policy;

/// Gate state per session identity.
///
/// `Unchecked → Checking → {Required, NotRequired}`, then for a gated
/// identity `Required → Changing → Changed`. A failed change submission is
/// reported through the returned error and the state settles back on
/// `Required` so the user can retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Unchecked,
    Checking,
    Required,
    NotRequired,
    Changing,
    Changed,
}

impl GateState {
    /// True while the gate must block portal access. An undecided check
    /// counts as blocking so a concurrent poll cannot dismiss the gating
    /// surface before the decision lands.
    pub fn blocks_access(&self) -> bool {
        matches!(
            self,
            GateState::Checking | GateState::Required | GateState::Changing
        )
    }
}

/// Password-change submission payload
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    /// current credential, required when re-verification is configured
    #[serde(default)]
    pub current_password: Option<String>,
    pub new_password: String,
    pub confirm_password: String,
}

/// Forced password-change workflow for admin-provisioned accounts.
///
/// Runs once per session activation. The state map serializes the workflow
/// per identity: while a check or a change is in flight, a concurrent check
/// for the same identity returns the in-flight state instead of issuing a
/// second remote call.
pub struct PasswordGateService {
    storage: Arc<dyn Storage>,
    provider: Arc<dyn IdentityProvider>,
    config: PasswordGateConfig,
    states: DashMap<String, GateState>,
}

impl PasswordGateService {
    /// Create a new gate service with the given dependencies
    pub fn new(
        storage: Arc<dyn Storage>,
        provider: Arc<dyn IdentityProvider>,
        config: PasswordGateConfig,
    ) -> Self {
        Self {
            storage,
            provider,
            config,
            states: DashMap::new(),
        }
    }

    /// Current gate state for an identity
    pub fn state_of(&self, identity_id: &str) -> GateState {
        self.states
            .get(identity_id)
            .map(|s| *s)
            .unwrap_or(GateState::Unchecked)
    }

    /// Run the gate check for an identity and return the resulting state.
    ///
    /// The check transitions `Unchecked → Checking` and reads the client
    /// record's onboarding flags: the change is required iff the record was
    /// admin-provisioned and the first login has not been completed. Accounts
    /// without a client record (staff) are never gated.
    pub async fn check(&self, identity_id: &str) -> Result<GateState> {
        match self.states.entry(identity_id.to_string()) {
            Entry::Occupied(mut entry) => match *entry.get() {
                // In-flight check or change for this identity: suppress the
                // duplicate and report the state as it stands.
                GateState::Checking | GateState::Changing => {
                    debug!("Gate check suppressed for {}: already in flight", identity_id);
                    return Ok(*entry.get());
                }
                _ => {
                    entry.insert(GateState::Checking);
                }
            },
            Entry::Vacant(entry) => {
                entry.insert(GateState::Checking);
            }
        }

        let record = match self.storage.get_client_by_identity(identity_id).await {
            Ok(record) => record,
            Err(err) => {
                // Roll the state back so the next activation re-checks
                self.states.remove(identity_id);
                return Err(err.into());
            }
        };

        let state = match record {
            Some(record) if record.created_by_admin && !record.first_login_completed => {
                GateState::Required
            }
            _ => GateState::NotRequired,
        };

        debug!("Gate check for {}: {:?}", identity_id, state);
        self.states.insert(identity_id.to_string(), state);
        Ok(state)
    }

    /// Submit a password change for a gated session.
    ///
    /// Mismatch and policy violations fail before any network call. With
    /// re-verification configured, the current credential is verified first
    /// and its fresh provider session performs the update; otherwise the
    /// session's stored provider token is used.
    pub async fn change_password(
        &self,
        session: &PortalSession,
        request: &ChangePasswordRequest,
    ) -> Result<GateState> {
        let identity_id = session.identity_id.as_str();

        // Only a REQUIRED gate accepts a submission; an unchecked session is
        // checked first so a direct API call cannot skip the decision.
        let state = match self.state_of(identity_id) {
            GateState::Unchecked => self.check(identity_id).await?,
            state => state,
        };
        match state {
            GateState::Required => {}
            GateState::Changing => {
                return Err(PortalError::Validation(
                    "A password change is already in progress".to_string(),
                ));
            }
            _ => {
                return Err(PortalError::Validation(
                    "Password change is not required for this account".to_string(),
                ));
            }
        }

        self.states
            .insert(identity_id.to_string(), GateState::Changing);

        match self.run_change(session, request).await {
            Ok(()) => {
                info!("Gate closed for {}: password changed", identity_id);
                self.states
                    .insert(identity_id.to_string(), GateState::Changed);
                Ok(GateState::Changed)
            }
            Err(err) => {
                // Back to REQUIRED so the user may retry
                self.states
                    .insert(identity_id.to_string(), GateState::Required);
                Err(err)
            }
        }
    }

    async fn run_change(
        &self,
        session: &PortalSession,
        request: &ChangePasswordRequest,
    ) -> Result<()> {
        // Local validation first: nothing below reaches the network
        if request.new_password != request.confirm_password {
            return Err(PortalError::Validation(
                "New password and confirmation do not match".to_string(),
            ));
        }
        validate_password_policy(&request.new_password, &self.config.policy)
            .map_err(PortalError::WeakCredential)?;

        let access_token = if self.config.require_reverification {
            let current = request.current_password.as_deref().ok_or_else(|| {
                PortalError::Validation("Current password is required".to_string())
            })?;
            let fresh = self
                .provider
                .verify_credential(&session.email, current)
                .await?;
            fresh.access_token
        } else {
            session.provider_token.clone()
        };

        self.provider
            .update_credential(&access_token, &request.new_password)
            .await?;

        // The credential is already replaced at the provider; if this flag
        // write fails the account stays usable with the new password and the
        // gate simply re-prompts on the next check.
        if let Err(err) = self
            .storage
            .set_first_login_completed(&session.identity_id)
            .await
        {
            warn!(
                "Credential updated for {} but flag write failed: {}",
                session.identity_id, err
            );
            return Err(PortalError::Database(format!(
                "Password changed but completion flag update failed: {}",
                err
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryIdentityProvider;
    use crate::config::settings::PasswordPolicy;
    use crate::models::ClientRecord;
    use crate::storage::memory::MemoryStorage;
    use chrono::{Duration, Utc};

    fn strict_config() -> PasswordGateConfig {
        PasswordGateConfig {
            require_reverification: true,
            policy: PasswordPolicy {
                min_length: 8,
                require_upper: true,
                require_digit: true,
            },
        }
    }

    fn lenient_config() -> PasswordGateConfig {
        PasswordGateConfig {
            require_reverification: false,
            policy: PasswordPolicy {
                min_length: 6,
                require_upper: false,
                require_digit: false,
            },
        }
    }

    struct Fixture {
        storage: Arc<MemoryStorage>,
        provider: Arc<MemoryIdentityProvider>,
        gate: PasswordGateService,
    }

    fn fixture(config: PasswordGateConfig) -> Fixture {
        let storage = Arc::new(MemoryStorage::new());
        let provider = Arc::new(MemoryIdentityProvider::new());
        let gate = PasswordGateService::new(storage.clone(), provider.clone(), config);
        Fixture {
            storage,
            provider,
            gate,
        }
    }

    async fn provisioned_session(f: &Fixture, email: &str, password: &str) -> PortalSession {
        let identity = f.provider.create_identity(email, password).await.unwrap();
        f.storage
            .insert_client(&ClientRecord::admin_provisioned(&identity.id, email))
            .await
            .unwrap();
        let provider_session = f.provider.verify_credential(email, password).await.unwrap();
        let now = Utc::now();
        PortalSession {
            token: "portal-token".to_string(),
            identity_id: identity.id,
            email: email.to_string(),
            provider_token: provider_session.access_token,
            created_at: now,
            expires_at: now + Duration::hours(24),
        }
    }

    #[tokio::test]
    async fn self_registered_account_is_never_gated() {
        let f = fixture(strict_config());
        let identity = f
            .provider
            .create_identity("walkin@test.com", "temporal1")
            .await
            .unwrap();
        let mut record = ClientRecord::admin_provisioned(&identity.id, "walkin@test.com");
        record.created_by_admin = false;

        // Both values of first_login_completed stay NOT_REQUIRED
        for completed in [false, true] {
            record.first_login_completed = completed;
            let storage = Arc::new(MemoryStorage::new());
            storage.insert_client(&record).await.unwrap();
            let gate =
                PasswordGateService::new(storage, f.provider.clone(), strict_config());
            assert_eq!(
                gate.check(&identity.id).await.unwrap(),
                GateState::NotRequired
            );
        }
    }

    #[tokio::test]
    async fn admin_provisioned_account_is_gated_until_changed() {
        let f = fixture(strict_config());
        let session = provisioned_session(&f, "cliente@test.com", "temporal1").await;

        assert_eq!(
            f.gate.check(&session.identity_id).await.unwrap(),
            GateState::Required
        );

        let request = ChangePasswordRequest {
            current_password: Some("temporal1".to_string()),
            new_password: "NuevoPass1".to_string(),
            confirm_password: "NuevoPass1".to_string(),
        };
        assert_eq!(
            f.gate.change_password(&session, &request).await.unwrap(),
            GateState::Changed
        );

        // Flag flipped and a fresh check finds nothing to do
        let record = f
            .storage
            .get_client_by_identity(&session.identity_id)
            .await
            .unwrap()
            .unwrap();
        assert!(record.first_login_completed);
        assert_eq!(
            f.gate.check(&session.identity_id).await.unwrap(),
            GateState::NotRequired
        );

        // And the provider accepted the new credential
        assert!(f
            .provider
            .verify_credential("cliente@test.com", "NuevoPass1")
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn mismatched_confirmation_never_reaches_the_provider() {
        let f = fixture(strict_config());
        let session = provisioned_session(&f, "cliente@test.com", "temporal1").await;
        f.gate.check(&session.identity_id).await.unwrap();

        let request = ChangePasswordRequest {
            current_password: Some("temporal1".to_string()),
            new_password: "NuevoPass1".to_string(),
            confirm_password: "OtraCosa2".to_string(),
        };
        let err = f.gate.change_password(&session, &request).await.unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));

        // Credential untouched, gate still required
        assert_eq!(
            f.provider.password_of("cliente@test.com").await.unwrap(),
            "temporal1"
        );
        assert_eq!(f.gate.state_of(&session.identity_id), GateState::Required);
    }

    #[tokio::test]
    async fn policy_violation_fails_before_any_network_call() {
        let f = fixture(strict_config());
        let session = provisioned_session(&f, "cliente@test.com", "temporal1").await;
        f.gate.check(&session.identity_id).await.unwrap();

        let request = ChangePasswordRequest {
            current_password: Some("temporal1".to_string()),
            new_password: "abc123".to_string(),
            confirm_password: "abc123".to_string(),
        };
        let err = f.gate.change_password(&session, &request).await.unwrap_err();
        assert!(matches!(err, PortalError::WeakCredential(_)));
        assert_eq!(
            f.provider.password_of("cliente@test.com").await.unwrap(),
            "temporal1"
        );
    }

    #[tokio::test]
    async fn wrong_current_password_fails_reverification() {
        let f = fixture(strict_config());
        let session = provisioned_session(&f, "cliente@test.com", "temporal1").await;
        f.gate.check(&session.identity_id).await.unwrap();

        let request = ChangePasswordRequest {
            current_password: Some("wrongpass1".to_string()),
            new_password: "NuevoPass1".to_string(),
            confirm_password: "NuevoPass1".to_string(),
        };
        let err = f.gate.change_password(&session, &request).await.unwrap_err();
        assert!(matches!(err, PortalError::InvalidCredential(_)));
        assert_eq!(f.gate.state_of(&session.identity_id), GateState::Required);
    }

    #[tokio::test]
    async fn lenient_variant_skips_reverification_and_relaxes_policy() {
        let f = fixture(lenient_config());
        let session = provisioned_session(&f, "cliente@test.com", "temporal1").await;
        f.gate.check(&session.identity_id).await.unwrap();

        // No current password, lowercase-only value: accepted by this variant
        let request = ChangePasswordRequest {
            current_password: None,
            new_password: "sencilla".to_string(),
            confirm_password: "sencilla".to_string(),
        };
        assert_eq!(
            f.gate.change_password(&session, &request).await.unwrap(),
            GateState::Changed
        );
        assert_eq!(
            f.provider.password_of("cliente@test.com").await.unwrap(),
            "sencilla"
        );
    }

    #[tokio::test]
    async fn submission_without_required_gate_is_rejected() {
        let f = fixture(strict_config());
        let identity = f
            .provider
            .create_identity("staff@test.com", "temporal1")
            .await
            .unwrap();
        let provider_session = f
            .provider
            .verify_credential("staff@test.com", "temporal1")
            .await
            .unwrap();
        let now = Utc::now();
        let session = PortalSession {
            token: "portal-token".to_string(),
            identity_id: identity.id,
            email: "staff@test.com".to_string(),
            provider_token: provider_session.access_token,
            created_at: now,
            expires_at: now + Duration::hours(24),
        };

        let request = ChangePasswordRequest {
            current_password: Some("temporal1".to_string()),
            new_password: "NuevoPass1".to_string(),
            confirm_password: "NuevoPass1".to_string(),
        };
        let err = f.gate.change_password(&session, &request).await.unwrap_err();
        assert!(matches!(err, PortalError::Validation(_)));
    }

    #[tokio::test]
    async fn concurrent_check_is_suppressed_while_changing() {
        let f = fixture(strict_config());
        let session = provisioned_session(&f, "cliente@test.com", "temporal1").await;
        f.gate.check(&session.identity_id).await.unwrap();

        // Simulate an in-flight change and re-open the gate
        f.gate
            .states
            .insert(session.identity_id.clone(), GateState::Changing);
        assert_eq!(
            f.gate.check(&session.identity_id).await.unwrap(),
            GateState::Changing
        );
    }
}
