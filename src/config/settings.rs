use std::env;
use std::net::SocketAddr;
use serde::{Serialize, Deserialize};

use crate::config::constants::*;

/// Main configuration container for the application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server settings
    pub server: ServerConfig,
    /// Database settings
    pub database: DatabaseConfig,
    /// External identity provider settings
    pub auth_provider: AuthProviderConfig,
    /// Forced password-change gate settings
    pub password_gate: PasswordGateConfig,
    /// Logging settings
    pub logging: LoggingConfig,
    /// Feature flags
    pub features: FeatureFlags,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            auth_provider: AuthProviderConfig::default(),
            password_gate: PasswordGateConfig::default(),
            logging: LoggingConfig::default(),
            features: FeatureFlags::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables or use defaults
    pub fn load() -> Self {
        Self {
            server: ServerConfig::load(),
            database: DatabaseConfig::load(),
            auth_provider: AuthProviderConfig::load(),
            password_gate: PasswordGateConfig::load(),
            logging: LoggingConfig::load(),
            features: FeatureFlags::load(),
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to listen on
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Portal session token expiration time in hours
    pub session_expiry_hours: i64,
    /// Maximum number of rows returned by admin list endpoints
    pub client_list_limit: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HTTP_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
            session_expiry_hours: DEFAULT_SESSION_EXPIRY_HOURS,
            client_list_limit: DEFAULT_CLIENT_LIST_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables or use defaults
    pub fn load() -> Self {
        let host = env::var("SERVER_HOST").unwrap_or_else(|_| DEFAULT_HTTP_HOST.to_string());
        let port = env::var("SERVER_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_HTTP_PORT);
        let session_expiry_hours = env::var("SESSION_EXPIRY_HOURS")
            .ok()
            .and_then(|h| h.parse::<i64>().ok())
            .unwrap_or(DEFAULT_SESSION_EXPIRY_HOURS);
        let client_list_limit = env::var("CLIENT_LIST_LIMIT")
            .ok()
            .and_then(|l| l.parse::<u32>().ok())
            .unwrap_or(DEFAULT_CLIENT_LIST_LIMIT);

        Self {
            host,
            port,
            session_expiry_hours,
            client_list_limit,
        }
    }

    /// Get socket address from host and port
    pub fn address(&self) -> Result<SocketAddr, std::io::Error> {
        format!("{}:{}", self.host, self.port).parse::<SocketAddr>()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database user
    pub user: String,
    /// Database password
    pub password: String,
    /// Database name
    pub name: String,
    /// Database host
    pub host: String,
    /// Database port
    pub port: u16,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: DEFAULT_DB_USER.to_string(),
            password: DEFAULT_DB_PASS.to_string(),
            name: DEFAULT_DB_NAME.to_string(),
            host: DEFAULT_DB_HOST.to_string(),
            port: DEFAULT_DB_PORT,
            max_connections: DEFAULT_DB_POOL,
            connection_timeout: DEFAULT_DB_CONN_TIMEOUT_SECS,
        }
    }
}

impl DatabaseConfig {
    /// Load database configuration from environment variables or use defaults
    pub fn load() -> Self {
        let user = env::var("DB_USER").unwrap_or_else(|_| DEFAULT_DB_USER.to_string());
        let password = env::var("DB_PASS").unwrap_or_else(|_| DEFAULT_DB_PASS.to_string());
        let name = env::var("DB_NAME").unwrap_or_else(|_| DEFAULT_DB_NAME.to_string());
        let host = env::var("DB_HOST").unwrap_or_else(|_| DEFAULT_DB_HOST.to_string());
        let port = env::var("DB_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(DEFAULT_DB_PORT);
        let max_connections = env::var("DB_POOL")
            .ok()
            .and_then(|c| c.parse::<u32>().ok())
            .unwrap_or(DEFAULT_DB_POOL);
        let connection_timeout = env::var("DB_CONNECTION_TIMEOUT")
            .ok()
            .and_then(|t| t.parse::<u64>().ok())
            .unwrap_or(DEFAULT_DB_CONN_TIMEOUT_SECS);

        Self {
            user,
            password,
            name,
            host,
            port,
            max_connections,
            connection_timeout,
        }
    }

    /// Generate database URL from individual components
    pub fn url(&self) -> String {
        format!(
            "mysql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }
}

/// External identity provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthProviderConfig {
    /// Base URL of the hosted authentication service
    pub base_url: String,
    /// Public API key sent with every request
    pub api_key: String,
    /// Service-role key used for admin-initiated sign-up
    pub service_key: String,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for AuthProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9999".to_string(),
            api_key: String::new(),
            service_key: String::new(),
            timeout_seconds: DEFAULT_PROVIDER_TIMEOUT_SECS,
        }
    }
}

impl AuthProviderConfig {
    /// Load identity provider configuration from environment variables or use defaults
    pub fn load() -> Self {
        Self {
            base_url: env::var("AUTH_PROVIDER_URL")
                .unwrap_or_else(|_| "http://localhost:9999".to_string()),
            api_key: env::var("AUTH_PROVIDER_API_KEY").unwrap_or_default(),
            service_key: env::var("AUTH_PROVIDER_SERVICE_KEY").unwrap_or_default(),
            timeout_seconds: env::var("AUTH_PROVIDER_TIMEOUT_SECONDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }
}

/// Password policy applied to the forced password-change submission
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length
    pub min_length: usize,
    /// Require at least one uppercase letter
    pub require_upper: bool,
    /// Require at least one digit
    pub require_digit: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: DEFAULT_GATE_MIN_PASSWORD_LEN,
            require_upper: true,
            require_digit: true,
        }
    }
}

/// Forced password-change gate settings.
///
/// Two historical variants of the change flow exist; they are expressed here
/// as one workflow with variant configuration. The strict variant
/// (re-verification plus length/uppercase/digit policy) is the default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordGateConfig {
    /// Re-verify the current credential before accepting the new one
    pub require_reverification: bool,
    /// Policy the new password must satisfy
    pub policy: PasswordPolicy,
}

impl Default for PasswordGateConfig {
    fn default() -> Self {
        Self {
            require_reverification: true,
            policy: PasswordPolicy::default(),
        }
    }
}

impl PasswordGateConfig {
    /// Load gate configuration from environment variables or use defaults
    pub fn load() -> Self {
        let require_reverification = env::var("GATE_REQUIRE_REVERIFICATION")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(true);
        let min_length = env::var("GATE_MIN_PASSWORD_LEN")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(DEFAULT_GATE_MIN_PASSWORD_LEN);
        let require_upper = env::var("GATE_REQUIRE_UPPERCASE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(true);
        let require_digit = env::var("GATE_REQUIRE_DIGIT")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(true);

        Self {
            require_reverification,
            policy: PasswordPolicy {
                min_length,
                require_upper,
                require_digit,
            },
        }
    }
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Emit JSON log lines instead of the compact format
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// Load logging configuration from environment variables or use defaults
    pub fn load() -> Self {
        let level = env::var("LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());
        let json_format = env::var("LOG_FORMAT")
            .map(|v| v.to_lowercase() == "json")
            .unwrap_or(false);

        Self { level, json_format }
    }
}

/// Feature flags configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Enable test mode which relaxes startup validation
    pub test_mode: bool,
    /// Enable request payload validation on the HTTP surface
    pub request_validation: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            test_mode: false,
            request_validation: true,
        }
    }
}

impl FeatureFlags {
    /// Load feature flags from environment variables or use defaults
    pub fn load() -> Self {
        let test_mode = env::var("RELO_PORTAL_TEST_MODE")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);
        let request_validation = env::var("REQUEST_VALIDATION")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(true);

        Self {
            test_mode,
            request_validation,
        }
    }
}
