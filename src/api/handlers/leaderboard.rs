//! Staff leaderboard endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::TeacherLeaderboardResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /api/v1/leaderboard/teachers` — Staff standings by points.
#[utoipa::path(
    get,
    path = "/api/v1/leaderboard/teachers",
    tag = "Dashboard",
    summary = "Get the teacher leaderboard",
    description = "Returns teachers ranked by points, best first, from the latest teacher progress snapshot.",
    responses(
        (status = 200, description = "Current standings", body = TeacherLeaderboardResponse),
        (status = 502, description = "Teachers query failed before any snapshot", body = ErrorResponse),
        (status = 503, description = "No snapshot received yet", body = ErrorResponse),
    )
)]
pub async fn get_teacher_leaderboard(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state.dashboard.teacher_leaderboard().await?;
    Ok(Json(TeacherLeaderboardResponse::from(view)))
}

/// Leaderboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/leaderboard/teachers", get(get_teacher_leaderboard))
}
