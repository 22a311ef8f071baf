use axum::{Json, extract::Extension};

use crate::app::dto::{HealthResponse, WhoAmIResponse};
use crate::context::PrincipalContext;

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "UP" })
}

pub async fn whoami(Extension(principal): Extension<PrincipalContext>) -> Json<WhoAmIResponse> {
    Json(WhoAmIResponse {
        principal_id: principal.principal_id().to_string(),
        roles: principal.roles().iter().map(|r| r.as_str().to_string()).collect(),
    })
}
