//! Parent-facing progress card for a single student.

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::clock::date_key;
use super::overview::{resolve_dollar_total, rounded_percentage};
use crate::domain::{DocumentId, StudentRecord, serialize_amount};

/// Number of ledger entries shown on the progress card.
pub const RECENT_REWARDS: usize = 5;

/// Reward line on the progress card.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RewardLine {
    /// Coerced amount.
    #[serde(serialize_with = "serialize_amount")]
    pub dollars: f64,
    /// Reason, if one was recorded.
    pub reason: Option<String>,
    /// Date as stored, if any.
    pub date: Option<String>,
}

/// Attendance and rewards summary for one student.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    /// Store key.
    #[schema(value_type = String)]
    pub id: DocumentId,
    /// Display name.
    pub name: String,
    /// Resolved dollar total.
    #[serde(serialize_with = "serialize_amount")]
    pub dollars: f64,
    /// Distinct days recorded present.
    pub present_days: usize,
    /// Distinct days recorded absent and not also present.
    pub absent_days: usize,
    /// `round(present / (present + absent) * 100)`, 0 with no records.
    pub attendance_percentage: u32,
    /// Whether an attendance entry exists for today.
    pub present_today: bool,
    /// Latest ledger entries, newest first.
    pub recent_rewards: Vec<RewardLine>,
}

/// Builds the progress card for `record` as of `today`.
#[must_use]
pub fn student_progress(record: &StudentRecord, today: NaiveDate) -> StudentProgress {
    let present_days = record.present_days().len();
    let absent_days = record.absent_days().len();
    let recent_rewards = record
        .rewards
        .iter()
        .rev()
        .take(RECENT_REWARDS)
        .map(|r| RewardLine {
            dollars: r.dollars.amount(),
            reason: r.reason.clone(),
            date: r.date.clone(),
        })
        .collect();

    StudentProgress {
        id: record.id.clone(),
        name: record.display_name().to_string(),
        dollars: resolve_dollar_total(record),
        present_days,
        absent_days,
        attendance_percentage: rounded_percentage(present_days, present_days + absent_days),
        present_today: record.present_on(&date_key(today)),
        recent_rewards,
    }
}
