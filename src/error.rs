use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for the entire application.
///
/// The first six variants form the domain taxonomy surfaced to callers of the
/// provisioning and password-change workflows; the rest cover ambient
/// failures (configuration, storage plumbing, network). Adapter errors are
/// mapped into this type at the workflow boundary and never travel further up
/// unclassified.
#[derive(Debug, Error, Clone, Serialize, Deserialize)]
pub enum PortalError {
    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Weak credential: {0}")]
    WeakCredential(String),

    #[error("Duplicate username: {0}")]
    DuplicateUsername(String),

    #[error("Invalid credential: {0}")]
    InvalidCredential(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unknown error: {0}")]
    Unknown(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, PortalError>;

impl PortalError {
    /// Create a new validation error
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not found error
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new config error
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new database error
    pub fn database<T: Into<String>>(msg: T) -> Self {
        Self::Database(msg.into())
    }

    /// Create a new internal error
    pub fn internal<T: Into<String>>(msg: T) -> Self {
        Self::Internal(msg.into())
    }

    /// Get error category for logging and response payloads
    pub fn category(&self) -> &'static str {
        match self {
            PortalError::AlreadyRegistered(_) => "already_registered",
            PortalError::WeakCredential(_) => "weak_credential",
            PortalError::DuplicateUsername(_) => "duplicate_username",
            PortalError::InvalidCredential(_) => "invalid_credential",
            PortalError::NotFound(_) => "not_found",
            PortalError::Unknown(_) => "unknown",
            PortalError::Validation(_) => "validation",
            PortalError::Authorization(_) => "authorization",
            PortalError::Config(_) => "config",
            PortalError::Database(_) => "database",
            PortalError::Network(_) => "network",
            PortalError::Serialization(_) => "serialization",
            PortalError::Internal(_) => "internal",
        }
    }

    /// Get HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            PortalError::AlreadyRegistered(_) => 409,
            PortalError::WeakCredential(_) => 400,
            PortalError::DuplicateUsername(_) => 409,
            PortalError::InvalidCredential(_) => 401,
            PortalError::NotFound(_) => 404,
            PortalError::Unknown(_) => 500,
            PortalError::Validation(_) => 400,
            PortalError::Authorization(_) => 403,
            PortalError::Config(_) => 500,
            PortalError::Database(_) => 500,
            PortalError::Network(_) => 502,
            PortalError::Serialization(_) => 400,
            PortalError::Internal(_) => 500,
        }
    }

    /// Convert to JSON for API responses
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.category(),
            "message": self.to_string(),
            "code": self.http_status_code(),
        })
    }
}

// Storage error conversions. Duplicate-key failures map to the generic
// database kind here; the provisioning workflow intercepts the profile-insert
// duplicate before this conversion runs and surfaces DuplicateUsername.
impl From<crate::storage::StorageError> for PortalError {
    fn from(err: crate::storage::StorageError) -> Self {
        use crate::storage::StorageError;
        match err {
            StorageError::NotFound(msg) => PortalError::NotFound(msg),
            StorageError::InvalidData(msg) => PortalError::Validation(msg),
            StorageError::Connection(msg) => PortalError::Network(msg),
            StorageError::ConfigurationError(msg) => PortalError::Config(msg),
            StorageError::Duplicate(msg) | StorageError::Database(msg) => {
                PortalError::Database(msg)
            }
            StorageError::Internal(msg) => PortalError::Internal(msg),
        }
    }
}

// Identity provider error conversions. Anything the adapter could not
// classify stays Unknown with the provider message preserved for display.
impl From<crate::auth::AuthError> for PortalError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::AlreadyRegistered(msg) => PortalError::AlreadyRegistered(msg),
            AuthError::WeakPassword(msg) => PortalError::WeakCredential(msg),
            AuthError::InvalidCredentials(msg) => PortalError::InvalidCredential(msg),
            AuthError::Network(msg) => PortalError::Network(msg),
            AuthError::InvalidResponseFormat(msg) => PortalError::Serialization(msg),
            AuthError::Unknown(msg) => PortalError::Unknown(msg),
        }
    }
}

// I/O error conversions
impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => PortalError::NotFound(err.to_string()),
            std::io::ErrorKind::TimedOut => PortalError::Network(err.to_string()),
            std::io::ErrorKind::InvalidInput => PortalError::Validation(err.to_string()),
            _ => PortalError::Internal(format!("I/O error: {}", err)),
        }
    }
}

// Serialization error conversions
impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Serialization(format!("JSON error: {}", err))
    }
}

// Actix web error conversions
impl From<PortalError> for actix_web::Error {
    fn from(error: PortalError) -> Self {
        let status_code = match error.http_status_code() {
            400 => actix_web::http::StatusCode::BAD_REQUEST,
            401 => actix_web::http::StatusCode::UNAUTHORIZED,
            403 => actix_web::http::StatusCode::FORBIDDEN,
            404 => actix_web::http::StatusCode::NOT_FOUND,
            409 => actix_web::http::StatusCode::CONFLICT,
            502 => actix_web::http::StatusCode::BAD_GATEWAY,
            _ => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        };

        actix_web::error::InternalError::new(error.to_string(), status_code).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn taxonomy_maps_to_expected_status_codes() {
        assert_eq!(PortalError::AlreadyRegistered("x".into()).http_status_code(), 409);
        assert_eq!(PortalError::WeakCredential("x".into()).http_status_code(), 400);
        assert_eq!(PortalError::DuplicateUsername("x".into()).http_status_code(), 409);
        assert_eq!(PortalError::InvalidCredential("x".into()).http_status_code(), 401);
        assert_eq!(PortalError::NotFound("x".into()).http_status_code(), 404);
        assert_eq!(PortalError::Unknown("x".into()).http_status_code(), 500);
    }

    #[test]
    fn to_json_carries_category_and_message() {
        let err = PortalError::DuplicateUsername("username 'maria' is taken".into());
        let json = err.to_json();
        assert_eq!(json["error"], "duplicate_username");
        assert_eq!(json["code"], 409);
        assert!(json["message"].as_str().unwrap().contains("maria"));
    }

    #[test]
    fn provider_unknown_preserves_message() {
        let err: PortalError =
            crate::auth::AuthError::Unknown("upstream exploded".to_string()).into();
        match err {
            PortalError::Unknown(msg) => assert!(msg.contains("upstream exploded")),
            other => panic!("expected Unknown, got {:?}", other),
        }
    }
}
