// Centralized configuration constants

// HTTP server
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const MIN_VALID_PORT: u16 = 1024;
pub const MAX_VALID_PORT: u16 = 65535;

// Sessions
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;

// Database (MySQL)
pub const DEFAULT_DB_USER: &str = "user";
pub const DEFAULT_DB_PASS: &str = "password";
pub const DEFAULT_DB_NAME: &str = "relo_portal";
pub const DEFAULT_DB_HOST: &str = "localhost";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_DB_POOL: u32 = 5;
pub const DEFAULT_DB_CONN_TIMEOUT_SECS: u64 = 30;

// Identity provider
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 30;

// Provisioning placeholders for admin-created clients. Passport number is
// the prefix plus the creation timestamp; the client replaces every
// placeholder when completing the profile form.
pub const PLACEHOLDER_PASSPORT_PREFIX: &str = "TEMP-";
pub const PLACEHOLDER_PHONE: &str = "000000000";

// Temporary passwords handed out by administrators
pub const MIN_TEMP_PASSWORD_LEN: usize = 6;

// Password-change policy default (strict variant)
pub const DEFAULT_GATE_MIN_PASSWORD_LEN: usize = 8;

// Logging
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Admin listing
pub const DEFAULT_CLIENT_LIST_LIMIT: u32 = 100;
