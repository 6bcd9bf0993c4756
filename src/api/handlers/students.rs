//! Student endpoints: parent progress card and staff writes.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{Map, Value};

use crate::api::dto::{AttendanceRequest, RewardRequest};
use crate::app_state::AppState;
use crate::domain::DocumentId;
use crate::error::{ErrorResponse, GatewayError};
use crate::pipeline::StudentProgress;

/// `GET /api/v1/students/{id}/progress` — Progress card of one student.
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/progress",
    tag = "Students",
    summary = "Get student progress",
    description = "Returns the dollar total, attendance counts, and most recent rewards of one student.",
    params(("id" = String, Path, description = "Student document ID")),
    responses(
        (status = 200, description = "Progress card", body = StudentProgress),
        (status = 404, description = "Student not found", body = ErrorResponse),
    )
)]
pub async fn get_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, GatewayError> {
    let progress = state.dashboard.student_progress(&DocumentId::new(id))?;
    Ok(Json(progress))
}

/// `PUT /api/v1/students/{id}` — Create or replace a student document.
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}",
    tag = "Students",
    summary = "Save a student",
    description = "Stores the given fields as the student document. Fields follow the stored layout: `name`, `rewards`, `dollarPoints`, `attendance`, `absentDates`.",
    params(("id" = String, Path, description = "Student document ID")),
    request_body(content = serde_json::Value, description = "Student document fields"),
    responses(
        (status = 200, description = "Student saved", body = StudentProgress),
        (status = 400, description = "Blank ID", body = ErrorResponse),
        (status = 502, description = "Store rejected the write", body = ErrorResponse),
    )
)]
pub async fn put_student(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, GatewayError> {
    let progress = state.dashboard.upsert_student(DocumentId::new(id), fields)?;
    Ok(Json(progress))
}

/// `POST /api/v1/students/{id}/attendance` — Record a present or absent day.
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/attendance",
    tag = "Students",
    summary = "Record attendance",
    description = "Marks the student present or absent on the given day, today by default.",
    params(("id" = String, Path, description = "Student document ID")),
    request_body = AttendanceRequest,
    responses(
        (status = 200, description = "Attendance recorded", body = StudentProgress),
        (status = 404, description = "Student not found", body = ErrorResponse),
    )
)]
pub async fn post_attendance(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<AttendanceRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let progress = state
        .dashboard
        .mark_attendance(&DocumentId::new(id), req.date, req.present)?;
    Ok(Json(progress))
}

/// `POST /api/v1/students/{id}/rewards` — Append to the rewards ledger.
#[utoipa::path(
    post,
    path = "/api/v1/students/{id}/rewards",
    tag = "Students",
    summary = "Award dollars",
    description = "Appends a ledger entry to the student. Negative amounts record a deduction.",
    params(("id" = String, Path, description = "Student document ID")),
    request_body = RewardRequest,
    responses(
        (status = 200, description = "Reward recorded", body = StudentProgress),
        (status = 400, description = "Zero amount", body = ErrorResponse),
        (status = 404, description = "Student not found", body = ErrorResponse),
    )
)]
pub async fn post_reward(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RewardRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let progress = state
        .dashboard
        .award_reward(&DocumentId::new(id), req.dollars, req.reason)?;
    Ok(Json(progress))
}

/// Student routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/students/{id}", put(put_student))
        .route("/students/{id}/progress", get(get_progress))
        .route("/students/{id}/attendance", post(post_attendance))
        .route("/students/{id}/rewards", post(post_reward))
}
