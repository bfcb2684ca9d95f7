use actix_web::{post, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::handlers::{bearer_token, error_response};
use crate::server::app_state::AppState;

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response body.
///
/// `password_change_required` tells the portal UI to open the gating surface
/// immediately instead of waiting for the first gate poll.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub identity_id: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub password_change_required: bool,
}

/// Portal login
#[post("/api/auth/login")]
pub async fn handle_login(
    body: web::Json<LoginRequest>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    debug!("Login attempt for {}", body.email);

    let outcome = match state.sessions.login(&body.email, &body.password).await {
        Ok(outcome) => outcome,
        Err(err) => return error_response(&err),
    };

    // Session activation runs the gate check once, up front
    let gate_state = match state.gate.check(&outcome.identity_id).await {
        Ok(gate_state) => gate_state,
        Err(err) => return error_response(&err),
    };

    info!(
        "Login successful for identity {} (gate: {:?})",
        outcome.identity_id, gate_state
    );

    HttpResponse::Ok().json(LoginResponse {
        token: outcome.token,
        identity_id: outcome.identity_id,
        expires_at: outcome.expires_at,
        password_change_required: gate_state.blocks_access(),
    })
}

/// Portal logout
#[post("/api/auth/logout")]
pub async fn handle_logout(req: HttpRequest, state: web::Data<Arc<AppState>>) -> impl Responder {
    let token = match bearer_token(&req) {
        Some(token) => token,
        None => return HttpResponse::NoContent().finish(),
    };

    match state.sessions.logout(token).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(&err),
    }
}
