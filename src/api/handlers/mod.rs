//! REST endpoint handlers organized by resource.

pub mod announcements;
pub mod leaderboard;
pub mod overview;
pub mod students;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(overview::routes())
        .merge(announcements::routes())
        .merge(leaderboard::routes())
        .merge(students::routes())
}
