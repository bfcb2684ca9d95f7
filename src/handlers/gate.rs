use actix_web::{get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::handlers::{authenticate_request, error_response};
use crate::server::app_state::AppState;
use crate::services::{ChangePasswordRequest, GateState};

/// Gate status response body
#[derive(Debug, Serialize)]
pub struct GateStatusResponse {
    pub state: GateState,
    pub password_change_required: bool,
}

/// Check whether the session's account must change its password.
///
/// Driven automatically by the portal on session activation; re-invoking it
/// while a check or change is in flight returns the in-flight state without
/// touching the store again.
#[get("/api/gate")]
pub async fn handle_gate_status(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let session = match authenticate_request(&state, &req).await {
        Ok(session) => session,
        Err(err) => return error_response(&err),
    };

    match state.gate.check(&session.identity_id).await {
        Ok(gate_state) => HttpResponse::Ok().json(GateStatusResponse {
            state: gate_state,
            password_change_required: gate_state.blocks_access(),
        }),
        Err(err) => error_response(&err),
    }
}

/// Submit the forced password change for a gated session
#[post("/api/gate/password")]
pub async fn handle_change_password(
    req: HttpRequest,
    body: web::Json<ChangePasswordRequest>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let session = match authenticate_request(&state, &req).await {
        Ok(session) => session,
        Err(err) => return error_response(&err),
    };

    match state.gate.change_password(&session, &body).await {
        Ok(gate_state) => {
            info!("Password change completed for {}", session.identity_id);
            HttpResponse::Ok().json(GateStatusResponse {
                state: gate_state,
                password_change_required: gate_state.blocks_access(),
            })
        }
        Err(err) => error_response(&err),
    }
}
