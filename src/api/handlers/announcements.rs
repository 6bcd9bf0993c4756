//! Announcement feed endpoints.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{
    AnnouncementsResponse, CreateAnnouncementRequest, CreateAnnouncementResponse, RoleParams,
};
use crate::app_state::AppState;
use crate::domain::Audience;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /api/v1/announcements?role=` — Announcement feed of a dashboard.
#[utoipa::path(
    get,
    path = "/api/v1/announcements",
    tag = "Announcements",
    summary = "List announcements for a role",
    description = "Returns the newest announcements visible to the given role. Admins see every audience, teachers see `Teachers` and `All`, parents see `Parents`, `All Students` and `All`.",
    params(RoleParams),
    responses(
        (status = 200, description = "Announcement feed", body = AnnouncementsResponse),
        (status = 400, description = "Missing or unknown role", body = ErrorResponse),
        (status = 503, description = "No snapshot received yet", body = ErrorResponse),
    )
)]
pub async fn list_announcements(
    State(state): State<AppState>,
    Query(params): Query<RoleParams>,
) -> Result<impl IntoResponse, GatewayError> {
    let role = params.parse()?;
    let view = state.dashboard.announcements(role).await?;
    Ok(Json(AnnouncementsResponse::new(role, view)))
}

/// `POST /api/v1/announcements` — Post a new announcement.
#[utoipa::path(
    post,
    path = "/api/v1/announcements",
    tag = "Announcements",
    summary = "Post an announcement",
    description = "Stores a new announcement dated now. The feeds are updated once the store delivers the next notifications snapshot.",
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement stored", body = CreateAnnouncementResponse),
        (status = 400, description = "Empty title or unknown audience", body = ErrorResponse),
        (status = 502, description = "Store rejected the write", body = ErrorResponse),
    )
)]
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(req): Json<CreateAnnouncementRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let audience = Audience::from_tag(req.audience.trim());
    let id = state.dashboard.post_announcement(
        &req.title,
        &req.message,
        audience,
        req.is_important,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(CreateAnnouncementResponse {
            id,
            created_at: Utc::now(),
        }),
    ))
}

/// Announcement routes.
pub fn routes() -> Router<AppState> {
    Router::new().route(
        "/announcements",
        get(list_announcements).post(create_announcement),
    )
}
