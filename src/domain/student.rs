//! Student records decoded from the `students` collection.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

use super::collection::Document;
use super::{DocumentId, DollarAmount};

/// Display name substituted when a record has no usable `name`.
pub const UNKNOWN_STUDENT_NAME: &str = "Unknown Student";

/// One entry of a student's rewards ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reward {
    /// Raw amount as stored.
    pub dollars: DollarAmount,
    /// Free-text reason given by the teacher.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// When the reward was given, as stored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl Reward {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                dollars: DollarAmount::from_value(map.get("dollars")),
                reason: non_empty_string(map.get("reason")),
                date: non_empty_string(map.get("date")),
            },
            _ => Self {
                dollars: DollarAmount::Missing,
                reason: None,
                date: None,
            },
        }
    }
}

/// Student record as seen by the dashboard.
///
/// Decoding never fails: a field with the wrong JSON type is treated as
/// absent and replaced by its default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    /// Store key.
    pub id: DocumentId,
    /// Display name, `None` when absent or blank.
    pub name: Option<String>,
    /// Rewards ledger in stored order.
    pub rewards: Vec<Reward>,
    /// Legacy cached total predating the ledger.
    pub dollar_points: DollarAmount,
    /// Dates (`YYYY-MM-DD`, optionally followed by a time) the student was
    /// present.
    pub attendance: Vec<String>,
    /// Dates the student was explicitly marked absent.
    pub absent_dates: Vec<String>,
}

impl StudentRecord {
    /// Decodes a raw `students` document.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let rewards = match doc.field("rewards") {
            Some(Value::Array(items)) => items.iter().map(Reward::from_value).collect(),
            _ => Vec::new(),
        };
        Self {
            id: doc.id.clone(),
            name: non_empty_string(doc.field("name")),
            rewards,
            dollar_points: DollarAmount::from_value(doc.field("dollarPoints")),
            attendance: date_set(doc.field("attendance")),
            absent_dates: date_set(doc.field("absentDates")),
        }
    }

    /// Returns the name to render, falling back to [`UNKNOWN_STUDENT_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_STUDENT_NAME)
    }

    /// Returns `true` if any attendance entry starts with `date_key`.
    #[must_use]
    pub fn present_on(&self, date_key: &str) -> bool {
        self.attendance.iter().any(|d| d.starts_with(date_key))
    }

    /// Distinct calendar days with an attendance entry.
    #[must_use]
    pub fn present_days(&self) -> BTreeSet<&str> {
        self.attendance.iter().map(|d| day_of(d)).collect()
    }

    /// Distinct calendar days marked absent. A day that also has an
    /// attendance entry counts as present only.
    #[must_use]
    pub fn absent_days(&self) -> BTreeSet<&str> {
        let present = self.present_days();
        self.absent_dates
            .iter()
            .map(|d| day_of(d))
            .filter(|day| !present.contains(day))
            .collect()
    }
}

/// `YYYY-MM-DD` part of a stored date entry.
fn day_of(entry: &str) -> &str {
    let entry = entry.trim();
    entry.get(..10).unwrap_or(entry)
}

/// Reads a trimmed, non-empty string field.
pub(crate) fn non_empty_string(value: Option<&Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Reads a set of date strings stored either as an array of strings or as a
/// map keyed by date. Map entries whose value is `false` or `null` are not
/// part of the set.
fn date_set(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::Object(map)) => map
            .iter()
            .filter(|(_, v)| !matches!(v, Value::Bool(false) | Value::Null))
            .map(|(k, _)| k.clone())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(fields: Value) -> StudentRecord {
        let Value::Object(map) = fields else {
            panic!("fields must be an object");
        };
        StudentRecord::from_document(&Document::new(DocumentId::new("s1"), map))
    }

    #[test]
    fn decodes_full_record() {
        let record = decode(json!({
            "name": "Maya",
            "rewards": [{"dollars": 5, "reason": "Helping"}, {"dollars": "3"}],
            "dollarPoints": 100,
            "attendance": ["2024-03-15T08:00:00"],
            "absentDates": ["2024-03-14"],
        }));
        assert_eq!(record.display_name(), "Maya");
        assert_eq!(record.rewards.len(), 2);
        assert_eq!(record.rewards.first().and_then(|r| r.reason.as_deref()), Some("Helping"));
        assert_eq!(record.dollar_points, DollarAmount::Number(100.0));
        assert!(record.present_on("2024-03-15"));
        assert!(!record.present_on("2024-03-14"));
        assert_eq!(record.absent_dates, vec!["2024-03-14".to_string()]);
    }

    #[test]
    fn malformed_fields_degrade_to_defaults() {
        let record = decode(json!({
            "name": 42,
            "rewards": "lots",
            "attendance": 7,
        }));
        assert_eq!(record.name, None);
        assert_eq!(record.display_name(), UNKNOWN_STUDENT_NAME);
        assert!(record.rewards.is_empty());
        assert!(record.attendance.is_empty());
        assert_eq!(record.dollar_points, DollarAmount::Missing);
    }

    #[test]
    fn blank_name_is_unknown() {
        let record = decode(json!({"name": "   "}));
        assert_eq!(record.name, None);
    }

    #[test]
    fn attendance_map_form_uses_truthy_keys() {
        let record = decode(json!({
            "attendance": {"2024-03-15": true, "2024-03-16": false, "2024-03-17": "present"}
        }));
        assert_eq!(
            record.attendance,
            vec!["2024-03-15".to_string(), "2024-03-17".to_string()]
        );
    }

    #[test]
    fn days_are_counted_once() {
        let record = decode(json!({
            "attendance": ["2024-03-15T08:00", "2024-03-15T13:00", "2024-03-14"],
            "absentDates": ["2024-03-14", "2024-03-13", "2024-03-13T09:00"],
        }));
        assert_eq!(
            record.present_days().into_iter().collect::<Vec<_>>(),
            vec!["2024-03-14", "2024-03-15"]
        );
        assert_eq!(
            record.absent_days().into_iter().collect::<Vec<_>>(),
            vec!["2024-03-13"]
        );
    }

    #[test]
    fn non_object_reward_entries_count_as_missing() {
        let record = decode(json!({"rewards": [7, null]}));
        assert_eq!(record.rewards.len(), 2);
        assert!(record.rewards.iter().all(|r| r.dollars == DollarAmount::Missing));
    }
}
