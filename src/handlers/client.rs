use actix_web::{get, put, web, HttpRequest, HttpResponse, Responder};
use std::sync::Arc;
use tracing::info;

use crate::error::PortalError;
use crate::handlers::{authenticate_request, error_response};
use crate::models::ClientFormData;
use crate::server::app_state::AppState;

/// Fetch the session's own client record
#[get("/api/clients/me")]
pub async fn handle_get_own_record(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let session = match authenticate_request(&state, &req).await {
        Ok(session) => session,
        Err(err) => return error_response(&err),
    };

    match state.storage.get_client_by_identity(&session.identity_id).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => error_response(&PortalError::not_found("No client record for this account")),
        Err(err) => error_response(&PortalError::from(err)),
    }
}

/// Complete the profile form, replacing the provisioning placeholders
#[put("/api/clients/me")]
pub async fn handle_complete_form(
    req: HttpRequest,
    body: web::Json<ClientFormData>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let session = match authenticate_request(&state, &req).await {
        Ok(session) => session,
        Err(err) => return error_response(&err),
    };

    if state.config.features.request_validation {
        if body.full_name.trim().is_empty() || body.passport_number.trim().is_empty() {
            return error_response(&PortalError::validation(
                "Full name and passport number are required",
            ));
        }
    }

    match state
        .storage
        .update_client_form(&session.identity_id, &body)
        .await
    {
        Ok(()) => {
            info!("Profile form completed for {}", session.identity_id);
            match state.storage.get_client_by_identity(&session.identity_id).await {
                Ok(Some(record)) => HttpResponse::Ok().json(record),
                Ok(None) => {
                    error_response(&PortalError::not_found("No client record for this account"))
                }
                Err(err) => error_response(&PortalError::from(err)),
            }
        }
        Err(err) => error_response(&PortalError::from(err)),
    }
}
