use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role assigned to an account profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Account profile row, keyed by the external identity id.
///
/// Exactly one profile exists per identity; it is created immediately after
/// the identity and never before it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// External identity id (primary key)
    pub identity_id: String,
    /// email address
    pub email: String,
    /// derived username (local part of the email, unique)
    pub username: String,
    /// role
    pub role: Role,
    /// active status
    pub is_active: bool,
    /// creation time
    pub created_at: DateTime<Utc>,
    /// update time
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new profile for a freshly created identity
    pub fn new(identity_id: &str, email: &str, username: &str, role: Role) -> Self {
        let now = Utc::now();
        Self {
            identity_id: identity_id.to_string(),
            email: email.to_string(),
            username: username.to_string(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
