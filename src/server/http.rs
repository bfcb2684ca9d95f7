use actix_web::{web, App, HttpServer};
use std::sync::Arc;
use tracing::info;

use crate::error::{PortalError, Result};
use crate::handlers::{admin, auth, client, gate, health};
use crate::server::app_state::AppState;

/// Build and run the HTTP server until shutdown
pub async fn run_http_server(state: Arc<AppState>) -> Result<()> {
    let address = state
        .config
        .server
        .address()
        .map_err(|e| PortalError::Config(format!("Invalid server address: {}", e)))?;

    info!("HTTP server listening on {}", address);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .service(health::handle_health_check)
            .service(auth::handle_login)
            .service(auth::handle_logout)
            .service(gate::handle_gate_status)
            .service(gate::handle_change_password)
            .service(client::handle_get_own_record)
            .service(client::handle_complete_form)
            .service(admin::handle_create_client)
            .service(admin::handle_list_clients)
            .service(admin::handle_get_client)
            .service(admin::handle_set_profile_active)
    })
    .bind(address)
    .map_err(|e| PortalError::Config(format!("Failed to bind {}: {}", address, e)))?
    .run()
    .await
    .map_err(|e| PortalError::Internal(format!("HTTP server error: {}", e)))
}
