//! Announcement DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::DocumentId;

/// Request body for `POST /announcements`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementRequest {
    /// Headline (required).
    pub title: String,
    /// Body text.
    #[serde(default)]
    pub message: String,
    /// One of `Teachers`, `Parents`, `All Students`, `All`.
    pub audience: String,
    /// Highlight flag.
    #[serde(default)]
    pub is_important: bool,
}

/// Response body for `POST /announcements` (201 Created).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAnnouncementResponse {
    /// Store key of the new announcement.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Posting timestamp.
    pub created_at: DateTime<Utc>,
}
