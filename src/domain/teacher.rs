//! Teacher progress records from the `teacherProgress` collection.

use serde::Serialize;

use super::collection::Document;
use super::student::non_empty_string;
use super::{DocumentId, DollarAmount};

/// Display name substituted when a teacher record has no usable `name`.
pub const UNKNOWN_TEACHER_NAME: &str = "Unknown Teacher";

/// Reward activity of one teacher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRecord {
    /// Store key.
    pub id: DocumentId,
    /// Display name, `None` when absent or blank.
    pub name: Option<String>,
    /// Points earned. Older documents only carry `dollarsGiven`.
    pub points: DollarAmount,
}

impl TeacherRecord {
    /// Decodes a raw `teacherProgress` document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let points = match DollarAmount::from_value(doc.field("points")) {
            DollarAmount::Missing => DollarAmount::from_value(doc.field("dollarsGiven")),
            points => points,
        };
        Self {
            id: doc.id.clone(),
            name: non_empty_string(doc.field("name")),
            points,
        }
    }

    /// Returns the name to render.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_TEACHER_NAME)
    }
}
