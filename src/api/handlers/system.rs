//! System endpoints: health check and role catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::ViewerRole;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// Dashboard role and the audience tags it sees.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleInfo {
    role: ViewerRole,
    audiences: Vec<&'static str>,
}

/// `GET /config/roles` — List dashboard roles.
#[utoipa::path(
    get,
    path = "/config/roles",
    tag = "System",
    summary = "List dashboard roles",
    description = "Returns every viewer role with the announcement audiences it is shown. An empty tag stands for announcements without an audience.",
    responses(
        (status = 200, description = "Role catalog", body = Vec<RoleInfo>),
    )
)]
pub async fn roles_handler() -> impl IntoResponse {
    let roles: Vec<RoleInfo> = ViewerRole::ALL
        .into_iter()
        .map(|role| RoleInfo {
            role,
            audiences: role
                .accepted_audiences()
                .iter()
                .map(|audience| audience.as_str())
                .collect(),
        })
        .collect();
    (StatusCode::OK, Json(roles))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/roles", get(roles_handler))
}
