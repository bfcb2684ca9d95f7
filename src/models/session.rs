use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Portal session minted after a successful login.
///
/// The provider access token is kept alongside the portal token so the
/// password-change workflow can call the identity provider on behalf of the
/// session without re-prompting for credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalSession {
    /// opaque portal token handed to the client
    pub token: String,
    /// identity this session belongs to
    pub identity_id: String,
    /// email address at login time
    pub email: String,
    /// access token issued by the identity provider
    pub provider_token: String,
    /// session creation time
    pub created_at: DateTime<Utc>,
    /// session expiration time
    pub expires_at: DateTime<Utc>,
}

impl PortalSession {
    /// True when the session has passed its expiry
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}
