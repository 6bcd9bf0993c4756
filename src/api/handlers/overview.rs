//! Home-tab overview endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::OverviewResponse;
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};

/// `GET /api/v1/overview` — Latest attendance and rewards summary.
#[utoipa::path(
    get,
    path = "/api/v1/overview",
    tag = "Dashboard",
    summary = "Get the overview",
    description = "Returns the summary computed from the latest students snapshot: head count, today's attendance, dollars given, and the top students. When the live query has failed since, the last good summary is returned with `stale: true`.",
    responses(
        (status = 200, description = "Current overview", body = OverviewResponse),
        (status = 502, description = "Students query failed before any snapshot", body = ErrorResponse),
        (status = 503, description = "No snapshot received yet", body = ErrorResponse),
    )
)]
pub async fn get_overview(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state.dashboard.overview().await?;
    Ok(Json(OverviewResponse::from(view)))
}

/// Overview routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/overview", get(get_overview))
}
