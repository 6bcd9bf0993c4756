//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use crate::api::dto::{
    AnnouncementsResponse, AttendanceRequest, CreateAnnouncementRequest,
    CreateAnnouncementResponse, OverviewResponse, RewardRequest, TeacherLeaderboardResponse,
};
use crate::api::handlers::{announcements, leaderboard, overview, students, system};
use crate::domain::{Audience, ViewerRole};
use crate::error::{ErrorBody, ErrorResponse};
use crate::pipeline::{
    AnnouncementView, LeaderboardEntry, OverviewSummary, RewardLine, StudentProgress,
    TeacherStanding,
};

/// Generated OpenAPI description of every REST endpoint.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "schoolboard-gateway",
        description = "Live attendance, rewards, and announcement dashboards"
    ),
    paths(
        system::health_handler,
        system::roles_handler,
        overview::get_overview,
        announcements::list_announcements,
        announcements::create_announcement,
        leaderboard::get_teacher_leaderboard,
        students::get_progress,
        students::put_student,
        students::post_attendance,
        students::post_reward,
    ),
    components(schemas(
        ErrorResponse,
        ErrorBody,
        OverviewResponse,
        OverviewSummary,
        LeaderboardEntry,
        AnnouncementsResponse,
        AnnouncementView,
        Audience,
        ViewerRole,
        CreateAnnouncementRequest,
        CreateAnnouncementResponse,
        TeacherLeaderboardResponse,
        TeacherStanding,
        StudentProgress,
        RewardLine,
        AttendanceRequest,
        RewardRequest,
        system::HealthResponse,
        system::RoleInfo,
    )),
    tags(
        (name = "System", description = "Health and configuration"),
        (name = "Dashboard", description = "Live overview and leaderboards"),
        (name = "Announcements", description = "Role-filtered announcement feeds"),
        (name = "Students", description = "Student progress and staff writes"),
    )
)]
pub struct ApiDoc;
