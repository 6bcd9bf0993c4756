//! Events emitted whenever a derived dashboard view is recomputed.
//!
//! Every snapshot delivered by a live query produces one or more
//! [`DashboardEvent`]s on the [`super::EventBus`]. WebSocket clients pick
//! the ones they care about by [`Topic`].

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Collection, ViewerRole};
use crate::pipeline::{AnnouncementView, OverviewSummary, TeacherStanding};

/// Subscription key for dashboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Home-tab overview (`overview`).
    Overview,
    /// Announcement feed of one role (`announcements:<role>`).
    Announcements(ViewerRole),
    /// Staff leaderboard (`teachers`).
    Teachers,
    /// Subscription health (`status`).
    Status,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overview => f.write_str("overview"),
            Self::Announcements(role) => write!(f, "announcements:{role}"),
            Self::Teachers => f.write_str("teachers"),
            Self::Status => f.write_str("status"),
        }
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "overview" => Ok(Self::Overview),
            "teachers" => Ok(Self::Teachers),
            "status" => Ok(Self::Status),
            other => match other.strip_prefix("announcements:") {
                Some(role) => role.parse().map(Self::Announcements),
                None => Err(format!("unknown topic '{other}'")),
            },
        }
    }
}

/// Event emitted after a derived view changes.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum DashboardEvent {
    /// The students snapshot changed and the overview was rebuilt.
    OverviewUpdated {
        /// New overview.
        overview: OverviewSummary,
        /// Recompute timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The notifications snapshot changed; one event per role.
    AnnouncementsUpdated {
        /// Role the feed was filtered for.
        role: ViewerRole,
        /// New feed.
        announcements: Vec<AnnouncementView>,
        /// Recompute timestamp.
        timestamp: DateTime<Utc>,
    },

    /// The teacher progress snapshot changed.
    TeacherLeaderboardUpdated {
        /// New standings.
        standings: Vec<TeacherStanding>,
        /// Recompute timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A live query reported an error. The previous view stays in place.
    SubscriptionFailed {
        /// Collection whose query failed.
        collection: Collection,
        /// Error description.
        message: String,
        /// Failure timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl DashboardEvent {
    /// Returns the topic this event is published under.
    #[must_use]
    pub const fn topic(&self) -> Topic {
        match self {
            Self::OverviewUpdated { .. } => Topic::Overview,
            Self::AnnouncementsUpdated { role, .. } => Topic::Announcements(*role),
            Self::TeacherLeaderboardUpdated { .. } => Topic::Teachers,
            Self::SubscriptionFailed { .. } => Topic::Status,
        }
    }

    /// Returns the event type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::OverviewUpdated { .. } => "overview_updated",
            Self::AnnouncementsUpdated { .. } => "announcements_updated",
            Self::TeacherLeaderboardUpdated { .. } => "teacher_leaderboard_updated",
            Self::SubscriptionFailed { .. } => "subscription_failed",
        }
    }
}
