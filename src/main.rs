use std::env;
use std::sync::Arc;
use dotenv::dotenv;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use relo_portal_server::{
    auth::HttpIdentityProvider,
    config::constants::{MAX_VALID_PORT, MIN_VALID_PORT},
    config::settings::Config,
    error::{PortalError, Result},
    server::startup::start_server_with_dependencies,
    storage::init_storage,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    // Initialize structured logging
    init_tracing()?;

    // Build configuration with validation
    let config = build_config()?;

    // Initialize storage layer with connection pooling
    let storage = init_storage(&config.database).await?;

    // Initialize the identity provider adapter
    let provider = Arc::new(
        HttpIdentityProvider::new(&config.auth_provider)
            .map_err(|e| PortalError::Config(format!("Identity provider init failed: {}", e)))?,
    );

    info!("🚀 Starting relo-portal-server v{}", env!("CARGO_PKG_VERSION"));
    print_startup_banner(&config);

    match start_server_with_dependencies(config, storage, provider).await {
        Ok(_) => {
            info!("✅ Server shutdown completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("❌ Server failed: {}", e);
            Err(e)
        }
    }
}

/// Initialize structured logging
fn init_tracing() -> Result<()> {
    let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "relo_portal_server=info,info".to_string());

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        );

    // JSON logging for production
    if env::var("LOG_FORMAT").unwrap_or_default() == "json" {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(false)
            .with_span_list(false);

        subscriber.with(json_layer).init();
    } else {
        subscriber.init();
    }

    info!("✅ Structured logging initialized with level: {}", log_level);
    Ok(())
}

/// Build configuration with validation
fn build_config() -> Result<Config> {
    info!("📋 Loading server configuration...");

    let config = Config::load();

    validate_config(&config)?;

    info!("✅ Configuration validated successfully");
    Ok(config)
}

/// Validate configuration before anything connects
fn validate_config(config: &Config) -> Result<()> {
    if config.server.host.is_empty() {
        return Err(PortalError::Config("Server host cannot be empty".to_string()));
    }

    if config.server.port < MIN_VALID_PORT {
        return Err(PortalError::Config(format!(
            "Invalid port: {}. Must be between {} and {}",
            config.server.port, MIN_VALID_PORT, MAX_VALID_PORT
        )));
    }

    if config.database.host.is_empty() {
        return Err(PortalError::Config("Database host cannot be empty".to_string()));
    }

    if config.database.name.is_empty() {
        return Err(PortalError::Config("Database name cannot be empty".to_string()));
    }

    if config.auth_provider.base_url.is_empty() {
        return Err(PortalError::Config(
            "Identity provider URL cannot be empty".to_string(),
        ));
    }

    // Weaker policies than the provisioning minimum would let the forced
    // change set a password the provider rejects outright
    if config.password_gate.policy.min_length < 6 {
        return Err(PortalError::Config(
            "Gate password policy minimum length must be at least 6".to_string(),
        ));
    }

    if !config.features.test_mode
        && (config.auth_provider.api_key.is_empty() || config.auth_provider.service_key.is_empty())
    {
        return Err(PortalError::Config(
            "Identity provider keys must be configured outside test mode".to_string(),
        ));
    }

    Ok(())
}

/// Print startup banner
fn print_startup_banner(config: &Config) {
    println!(
        "
╭─────────────────────────────────────────────────────╮
│                relo-portal-server                   │
│                     v{}                          │
├─────────────────────────────────────────────────────┤
│ 🌐 Address: {}:{}
│ 🔑 Identity provider: {}
│ 🔒 Gate: reverify={}, min_len={}
╰─────────────────────────────────────────────────────╯
",
        env!("CARGO_PKG_VERSION"),
        config.server.host,
        config.server.port,
        config.auth_provider.base_url,
        config.password_gate.require_reverification,
        config.password_gate.policy.min_length,
    );
}
