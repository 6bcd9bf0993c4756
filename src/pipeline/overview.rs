//! Home-tab overview: attendance counts, dollars given, and the top earners.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use utoipa::ToSchema;

use super::clock::date_key;
use crate::domain::{StudentRecord, serialize_amount};

/// Number of students shown on the overview leaderboard by default.
pub const DEFAULT_LEADERBOARD_SIZE: usize = 3;

/// One row of the student leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Display name (records sharing a name are merged).
    pub name: String,
    /// Combined resolved dollar total.
    #[serde(serialize_with = "serialize_amount")]
    pub dollars: f64,
}

/// Summary derived from one students snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverviewSummary {
    /// Number of records in the snapshot.
    pub total_students: usize,
    /// Records with an attendance entry for today.
    pub today_present_count: usize,
    /// `total_students - today_present_count`.
    pub today_absent_count: usize,
    /// Rounded share of students present today, 0 to 100.
    pub attendance_percentage: u32,
    /// Sum of every student's resolved dollar total.
    #[serde(serialize_with = "serialize_amount")]
    pub total_dollars_given: f64,
    /// Highest earners, best first.
    pub top_students: Vec<LeaderboardEntry>,
}

/// Resolves a student's dollar total.
///
/// Ledger entries are added at full precision. The ledger wins whenever it
/// sums to a positive amount. Otherwise (empty ledger, or one netting to
/// zero or less) the legacy `dollarPoints` total is used. The result is
/// never negative.
#[must_use]
pub fn resolve_dollar_total(record: &StudentRecord) -> f64 {
    let calculated: f64 = record
        .rewards
        .iter()
        .map(|reward| reward.dollars.amount())
        .sum();
    if calculated > 0.0 {
        return calculated;
    }
    record.dollar_points.amount().max(0.0)
}

/// Builds the overview for `snapshot` as of `today` with the default
/// leaderboard size.
#[must_use]
pub fn build_overview(snapshot: &[StudentRecord], today: NaiveDate) -> OverviewSummary {
    build_overview_with_limit(snapshot, today, DEFAULT_LEADERBOARD_SIZE)
}

/// Builds the overview for `snapshot` as of `today`, keeping `top_n`
/// leaderboard rows.
///
/// Pure: the same snapshot and date always produce the same summary.
#[must_use]
pub fn build_overview_with_limit(
    snapshot: &[StudentRecord],
    today: NaiveDate,
    top_n: usize,
) -> OverviewSummary {
    let key = date_key(today);
    let totals: Vec<f64> = snapshot.iter().map(resolve_dollar_total).collect();

    let total_students = snapshot.len();
    let today_present_count = snapshot.iter().filter(|s| s.present_on(&key)).count();
    let today_absent_count = total_students.saturating_sub(today_present_count);

    let named = snapshot
        .iter()
        .zip(&totals)
        .filter_map(|(s, total)| s.name.as_deref().map(|name| (name, *total)));
    let top_students = rank_by_name(named, top_n)
        .into_iter()
        .map(|(name, dollars)| LeaderboardEntry { name, dollars })
        .collect();

    OverviewSummary {
        total_students,
        today_present_count,
        today_absent_count,
        attendance_percentage: rounded_percentage(today_present_count, total_students),
        total_dollars_given: totals.iter().sum(),
        top_students,
    }
}

/// Merges amounts by name in first-seen order, then keeps the `limit`
/// largest. The sort is stable, so equal amounts keep first-seen order.
pub(crate) fn rank_by_name<'a>(
    items: impl IntoIterator<Item = (&'a str, f64)>,
    limit: usize,
) -> Vec<(String, f64)> {
    let mut grouped: Vec<(String, f64)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for (name, amount) in items {
        match index.get(name).and_then(|&i| grouped.get_mut(i)) {
            Some(entry) => entry.1 += amount,
            None => {
                index.insert(name, grouped.len());
                grouped.push((name.to_string(), amount));
            }
        }
    }
    grouped.sort_by(|a, b| b.1.total_cmp(&a.1));
    grouped.truncate(limit);
    grouped
}

/// `round(part / whole * 100)` with halves rounded up; 0 when `whole` is 0.
pub(crate) fn rounded_percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    let pct = (part * 200 + whole) / (whole * 2);
    u32::try_from(pct).unwrap_or(100)
}
