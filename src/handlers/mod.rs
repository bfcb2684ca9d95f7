// Module declarations
pub mod admin;
pub mod auth;
pub mod client;
pub mod gate;
pub mod health;

use actix_web::{HttpRequest, HttpResponse};
use std::sync::Arc;

use crate::error::{PortalError, Result};
use crate::models::{PortalSession, Profile, Role};
use crate::server::app_state::AppState;

/// Extract the bearer token from the Authorization header
pub fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get("Authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Resolve the request's bearer token to a portal session
pub async fn authenticate_request(
    state: &Arc<AppState>,
    req: &HttpRequest,
) -> Result<PortalSession> {
    let token = bearer_token(req).ok_or_else(|| {
        PortalError::InvalidCredential("Missing bearer token".to_string())
    })?;
    state.sessions.authenticate(token).await
}

/// Resolve the session and require an administrator profile
pub async fn authenticate_admin(
    state: &Arc<AppState>,
    req: &HttpRequest,
) -> Result<(PortalSession, Profile)> {
    let session = authenticate_request(state, req).await?;
    let profile = state
        .storage
        .get_profile(&session.identity_id)
        .await
        .map_err(PortalError::from)?
        .ok_or_else(|| PortalError::not_found("Profile not found"))?;

    if profile.role != Role::Admin {
        return Err(PortalError::Authorization(
            "Administrator role required".to_string(),
        ));
    }

    Ok((session, profile))
}

/// Build the error response for a failed handler
pub fn error_response(err: &PortalError) -> HttpResponse {
    let status = actix_web::http::StatusCode::from_u16(err.http_status_code())
        .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(err.to_json())
}
