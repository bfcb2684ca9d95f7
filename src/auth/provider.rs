use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::auth::classify::classify_provider_error;
use crate::auth::{AuthError, Result};
use crate::config::settings::AuthProviderConfig;

/// Identity record returned by the hosted authentication service
#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    /// opaque unique identifier
    pub id: String,
    /// email address
    pub email: String,
}

/// Authenticated provider session returned by credential verification
#[derive(Debug, Clone)]
pub struct ProviderSession {
    /// bearer token for follow-up calls on this identity
    pub access_token: String,
    /// token type, normally "bearer"
    pub token_type: String,
    /// the verified identity
    pub identity: Identity,
}

/// Adapter boundary for the external authentication service.
///
/// All three operations mutate provider state and none is idempotent at this
/// layer: repeating `create_identity` for an email that already succeeded
/// yields `AlreadyRegistered`.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Register a new identity with the given credentials
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity>;

    /// Verify credentials and obtain a provider session
    async fn verify_credential(&self, email: &str, password: &str) -> Result<ProviderSession>;

    /// Replace the credential of the identity behind the given access token
    async fn update_credential(&self, access_token: &str, new_password: &str) -> Result<()>;
}

// Provider token response structure
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    token_type: String,
    user: Identity,
}

// Provider error body. Different endpoints use different field names, so all
// known spellings are collected and the first present one wins.
#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ProviderErrorBody {
    fn into_message(self, fallback_status: u16) -> String {
        self.msg
            .or(self.message)
            .or(self.error_description)
            .or(self.error)
            .unwrap_or_else(|| format!("provider returned HTTP {}", fallback_status))
    }
}

/// HTTP adapter for the hosted authentication service
#[derive(Clone)]
pub struct HttpIdentityProvider {
    http: Client,
    base_url: String,
    api_key: String,
    service_key: String,
}

impl HttpIdentityProvider {
    /// Create the adapter from configuration
    pub fn new(config: &AuthProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AuthError::Network(format!("Failed to build HTTP client: {}", e)))?;

        info!("Identity provider adapter initialized: {}", config.base_url);

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            service_key: config.service_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Read the error body of a failed response and classify it
    async fn classify_response(&self, response: reqwest::Response) -> AuthError {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return AuthError::Network(format!("Failed to read error body: {}", e)),
        };

        let message = serde_json::from_str::<ProviderErrorBody>(&body)
            .unwrap_or_default()
            .into_message(status);

        debug!("Provider error (HTTP {}): {}", status, message);
        classify_provider_error(&message)
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn create_identity(&self, email: &str, password: &str) -> Result<Identity> {
        debug!("Creating identity for {}", email);

        let response = self
            .http
            .post(self.endpoint("/signup"))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.service_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Sign-up request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(self.classify_response(response).await);
        }

        let identity: Identity = response.json().await.map_err(|e| {
            AuthError::InvalidResponseFormat(format!("Malformed sign-up response: {}", e))
        })?;

        info!("Identity created: {}", identity.id);
        Ok(identity)
    }

    async fn verify_credential(&self, email: &str, password: &str) -> Result<ProviderSession> {
        debug!("Verifying credential for {}", email);

        let response = self
            .http
            .post(self.endpoint("/token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(self.classify_response(response).await);
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AuthError::InvalidResponseFormat(format!("Malformed token response: {}", e))
        })?;

        Ok(ProviderSession {
            access_token: token.access_token,
            token_type: token.token_type,
            identity: token.user,
        })
    }

    async fn update_credential(&self, access_token: &str, new_password: &str) -> Result<()> {
        debug!("Updating credential on current provider session");

        let response = self
            .http
            .put(self.endpoint("/user"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .json(&json!({ "password": new_password }))
            .send()
            .await
            .map_err(|e| AuthError::Network(format!("Credential update request failed: {}", e)))?;

        if !response.status().is_success() {
            let err = self.classify_response(response).await;
            warn!("Credential update rejected by provider: {}", err);
            return Err(err);
        }

        info!("Provider credential updated");
        Ok(())
    }
}
