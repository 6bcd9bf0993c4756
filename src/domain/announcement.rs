//! Announcements decoded from the `notifications` collection, plus the
//! audience tags and viewer roles that control who sees them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use super::DocumentId;
use super::collection::Document;
use super::student::non_empty_string;

/// Visibility tag carried by an announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ToSchema)]
pub enum Audience {
    /// Staff only.
    Teachers,
    /// Parents only.
    Parents,
    /// Students and their parents.
    AllStudents,
    /// Everyone.
    All,
    /// Missing or unrecognised tag. Only administrators see these.
    Unspecified,
}

impl Audience {
    /// Returns the tag as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Teachers => "Teachers",
            Self::Parents => "Parents",
            Self::AllStudents => "All Students",
            Self::All => "All",
            Self::Unspecified => "",
        }
    }

    /// Maps a stored tag to an audience. Matching is exact.
    #[must_use]
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Teachers" => Self::Teachers,
            "Parents" => Self::Parents,
            "All Students" => Self::AllStudents,
            "All" => Self::All,
            _ => Self::Unspecified,
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Audience {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Audience {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Self::from_tag(&tag))
    }
}

/// Dashboard a viewer is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ViewerRole {
    /// School administrator.
    Admin,
    /// Teacher.
    Teacher,
    /// Parent of a student.
    Parent,
}

const ADMIN_AUDIENCES: &[Audience] = &[
    Audience::Teachers,
    Audience::Parents,
    Audience::AllStudents,
    Audience::All,
    Audience::Unspecified,
];
const TEACHER_AUDIENCES: &[Audience] = &[Audience::Teachers, Audience::All];
const PARENT_AUDIENCES: &[Audience] = &[Audience::Parents, Audience::AllStudents, Audience::All];

impl ViewerRole {
    /// Every role, in a fixed order.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Teacher, Self::Parent];

    /// Audience tags this role accepts.
    #[must_use]
    pub const fn accepted_audiences(self) -> &'static [Audience] {
        match self {
            Self::Admin => ADMIN_AUDIENCES,
            Self::Teacher => TEACHER_AUDIENCES,
            Self::Parent => PARENT_AUDIENCES,
        }
    }

    /// Returns the lowercase role name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Teacher => "teacher",
            Self::Parent => "parent",
        }
    }
}

impl fmt::Display for ViewerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViewerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown role '{s}'"))
    }
}

/// Announcement timestamp in whichever shape the writer used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnouncementDate {
    /// Store-native timestamp (`{seconds, nanoseconds}`).
    StoreTimestamp {
        /// Seconds since the Unix epoch.
        seconds: i64,
        /// Sub-second part.
        nanoseconds: u32,
    },
    /// Already a calendar instant (RFC 3339 string or epoch milliseconds).
    Native(DateTime<Utc>),
    /// Absent or unreadable.
    Missing,
}

impl AnnouncementDate {
    /// Classifies an optional JSON value.
    #[must_use]
    pub fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => store_timestamp(map).unwrap_or(Self::Missing),
            Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .map(|dt| Self::Native(dt.with_timezone(&Utc)))
                .unwrap_or(Self::Missing),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)
                .map_or(Self::Missing, Self::Native),
            _ => Self::Missing,
        }
    }

    /// Resolves the date to an instant, substituting `now` when missing or
    /// out of range.
    #[must_use]
    pub fn normalize(self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Self::StoreTimestamp {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(seconds, nanoseconds).unwrap_or(now),
            Self::Native(dt) => dt,
            Self::Missing => now,
        }
    }
}

fn store_timestamp(map: &Map<String, Value>) -> Option<AnnouncementDate> {
    let seconds = map
        .get("seconds")
        .or_else(|| map.get("_seconds"))
        .and_then(Value::as_i64)?;
    let nanoseconds = map
        .get("nanoseconds")
        .or_else(|| map.get("_nanoseconds"))
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok())
        .unwrap_or(0);
    Some(AnnouncementDate::StoreTimestamp {
        seconds,
        nanoseconds,
    })
}

/// Announcement record as stored.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnouncementRecord {
    /// Store key.
    pub id: DocumentId,
    /// Headline, empty when absent.
    pub title: String,
    /// Body text, empty when absent.
    pub message: String,
    /// Visibility tag.
    pub audience: Audience,
    /// Posting date.
    pub date: AnnouncementDate,
    /// Highlighted in the UI when set.
    pub is_important: bool,
}

impl AnnouncementRecord {
    /// Decodes a raw `notifications` document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let audience = doc
            .field("audience")
            .and_then(Value::as_str)
            .map_or(Audience::Unspecified, Audience::from_tag);
        Self {
            id: doc.id.clone(),
            title: non_empty_string(doc.field("title")).unwrap_or_default(),
            message: non_empty_string(doc.field("message")).unwrap_or_default(),
            audience,
            date: AnnouncementDate::from_value(doc.field("date")),
            is_important: doc
                .field("isImportant")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        }
    }
}
