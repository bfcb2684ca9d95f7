pub mod classify;
pub mod provider;
pub mod memory;
pub mod token;

pub use provider::{HttpIdentityProvider, Identity, IdentityProvider, ProviderSession};
pub use memory::MemoryIdentityProvider;

/// Errors returned by the identity provider adapter.
///
/// The hosted provider reports failures as message strings; `classify`
/// translates the known phrases into the structured variants below and
/// everything else stays `Unknown` with the original text preserved.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    #[error("Already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Weak password: {0}")]
    WeakPassword(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response format: {0}")]
    InvalidResponseFormat(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Adapter result type
pub type Result<T> = std::result::Result<T, AuthError>;
