//! Response wrappers for the live dashboard views.
//!
//! Every view response carries the computation time and a `stale` flag set
//! when the live query failed after the view was computed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::ViewerRole;
use crate::pipeline::{AnnouncementView, OverviewSummary, TeacherStanding};
use crate::service::ViewState;

/// Response body for `GET /overview`.
#[derive(Debug, Serialize, ToSchema)]
pub struct OverviewResponse {
    /// Current overview.
    pub data: OverviewSummary,
    /// When the overview was computed.
    pub updated_at: DateTime<Utc>,
    /// `true` if the students query failed since.
    pub stale: bool,
    /// Failure message when stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<ViewState<OverviewSummary>> for OverviewResponse {
    fn from(state: ViewState<OverviewSummary>) -> Self {
        Self {
            stale: state.is_stale(),
            data: state.data,
            updated_at: state.updated_at,
            last_error: state.last_error,
        }
    }
}

/// Response body for `GET /announcements`.
#[derive(Debug, Serialize, ToSchema)]
pub struct AnnouncementsResponse {
    /// Role the feed was filtered for.
    pub role: ViewerRole,
    /// Announcements, newest first.
    pub data: Vec<AnnouncementView>,
    /// When the feed was computed.
    pub updated_at: DateTime<Utc>,
    /// `true` if the notifications query failed since.
    pub stale: bool,
    /// Failure message when stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl AnnouncementsResponse {
    /// Wraps a feed for `role`.
    #[must_use]
    pub fn new(role: ViewerRole, state: ViewState<Vec<AnnouncementView>>) -> Self {
        Self {
            role,
            stale: state.is_stale(),
            data: state.data,
            updated_at: state.updated_at,
            last_error: state.last_error,
        }
    }
}

/// Response body for `GET /leaderboard/teachers`.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherLeaderboardResponse {
    /// Standings, best first.
    pub data: Vec<TeacherStanding>,
    /// When the standings were computed.
    pub updated_at: DateTime<Utc>,
    /// `true` if the teachers query failed since.
    pub stale: bool,
    /// Failure message when stale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl From<ViewState<Vec<TeacherStanding>>> for TeacherLeaderboardResponse {
    fn from(state: ViewState<Vec<TeacherStanding>>) -> Self {
        Self {
            stale: state.is_stale(),
            data: state.data,
            updated_at: state.updated_at,
            last_error: state.last_error,
        }
    }
}
