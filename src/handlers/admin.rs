use actix_web::{get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};

use crate::error::PortalError;
use crate::handlers::{authenticate_admin, error_response};
use crate::models::ClientRecord;
use crate::server::app_state::AppState;

/// Create-client request body
#[derive(Debug, Deserialize)]
pub struct CreateClientRequest {
    pub email: String,
    pub password: String,
}

/// Create-client response body
#[derive(Debug, Serialize)]
pub struct CreateClientResponse {
    pub client_id: u64,
    pub identity_id: String,
    pub username: String,
    pub email: String,
}

/// Client listing response body
#[derive(Debug, Serialize)]
pub struct ClientListResponse {
    pub clients: Vec<ClientRecord>,
}

/// Provision a new client account (admin only)
#[post("/api/admin/clients")]
pub async fn handle_create_client(
    req: HttpRequest,
    body: web::Json<CreateClientRequest>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    let (session, _) = match authenticate_admin(&state, &req).await {
        Ok(ok) => ok,
        Err(err) => return error_response(&err),
    };

    info!(
        "Admin {} provisioning client account for {}",
        session.identity_id, body.email
    );

    match state
        .provisioning
        .provision_client(&body.email, &body.password)
        .await
    {
        Ok(provisioned) => HttpResponse::Created().json(CreateClientResponse {
            client_id: provisioned.client_id,
            identity_id: provisioned.identity_id,
            username: provisioned.username,
            email: provisioned.email,
        }),
        Err(err) => {
            error!("Provisioning failed for {}: {}", body.email, err);
            error_response(&err)
        }
    }
}

/// List client records for the back-office table (admin only)
#[get("/api/admin/clients")]
pub async fn handle_list_clients(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    if let Err(err) = authenticate_admin(&state, &req).await {
        return error_response(&err);
    }

    match state
        .storage
        .list_clients(state.config.server.client_list_limit)
        .await
    {
        Ok(clients) => HttpResponse::Ok().json(ClientListResponse { clients }),
        Err(err) => {
            let err = PortalError::from(err);
            error!("Client listing failed: {}", err);
            error_response(&err)
        }
    }
}

/// Fetch one client record by its generated id (admin only).
///
/// The provisioning response hands this id back so the back office can jump
/// straight to the freshly created record.
#[get("/api/admin/clients/{id}")]
pub async fn handle_get_client(
    req: HttpRequest,
    path: web::Path<u64>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    if let Err(err) = authenticate_admin(&state, &req).await {
        return error_response(&err);
    }

    match state.storage.get_client_by_id(path.into_inner()).await {
        Ok(Some(record)) => HttpResponse::Ok().json(record),
        Ok(None) => error_response(&PortalError::not_found("Client record not found")),
        Err(err) => error_response(&PortalError::from(err)),
    }
}

/// Profile activation request body
#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Activate or deactivate a profile (admin only). Inactive profiles cannot
/// log in to the portal.
#[put("/api/admin/profiles/{identity_id}/active")]
pub async fn handle_set_profile_active(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<SetActiveRequest>,
    state: web::Data<Arc<AppState>>,
) -> impl Responder {
    if let Err(err) = authenticate_admin(&state, &req).await {
        return error_response(&err);
    }

    let identity_id = path.into_inner();
    match state
        .storage
        .set_profile_active(&identity_id, body.active)
        .await
    {
        Ok(()) => {
            info!("Profile {} active flag set to {}", identity_id, body.active);
            HttpResponse::NoContent().finish()
        }
        Err(err) => error_response(&PortalError::from(err)),
    }
}
