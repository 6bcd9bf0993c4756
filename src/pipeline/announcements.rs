//! Per-role announcement feed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::Clock;
use crate::domain::{AnnouncementRecord, Audience, DocumentId};

/// Default number of announcements shown on a dashboard.
pub const DEFAULT_ANNOUNCEMENT_LIMIT: usize = 5;

/// Announcement ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementView {
    /// Store key.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Headline.
    pub title: String,
    /// Body text.
    pub message: String,
    /// Visibility tag.
    pub audience: Audience,
    /// Resolved posting instant.
    pub date: DateTime<Utc>,
    /// `date` formatted for display in the school's time zone, e.g.
    /// `Mar 15, 2024`.
    pub display_date: String,
    /// Highlight flag.
    pub is_important: bool,
}

/// Keeps the announcements whose audience is in `accepted`, resolves their
/// dates (missing dates become the clock's now), and returns at most
/// `limit` of them. Display dates use the clock's local time zone, the same
/// one that decides "today".
///
/// Input order is preserved; the store delivers announcements newest first
/// and this function does not re-sort.
#[must_use]
pub fn filter_announcements(
    snapshot: &[AnnouncementRecord],
    accepted: &[Audience],
    clock: &dyn Clock,
    limit: usize,
) -> Vec<AnnouncementView> {
    let now = clock.now();
    snapshot
        .iter()
        .filter(|a| accepted.contains(&a.audience))
        .take(limit)
        .map(|a| {
            let date = a.date.normalize(now);
            AnnouncementView {
                id: a.id.clone(),
                title: a.title.clone(),
                message: a.message.clone(),
                audience: a.audience,
                date,
                display_date: clock.local(date).format("%b %-d, %Y").to_string(),
                is_important: a.is_important,
            }
        })
        .collect()
}
