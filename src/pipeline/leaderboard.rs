//! Staff leaderboard from teacher progress records.

use serde::Serialize;
use utoipa::ToSchema;

use super::overview::rank_by_name;
use crate::domain::{TeacherRecord, serialize_amount};

/// Number of teachers shown on the staff leaderboard by default.
pub const DEFAULT_TEACHER_LEADERBOARD_SIZE: usize = 5;

/// One row of the staff leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct TeacherStanding {
    /// 1-based position.
    pub rank: usize,
    /// Teacher display name.
    pub name: String,
    /// Combined points, never negative.
    #[serde(serialize_with = "serialize_amount")]
    pub points: f64,
}

/// Ranks teachers by points, merging records that share a name.
///
/// Unnamed records are left out; ties keep snapshot order.
#[must_use]
pub fn build_teacher_leaderboard(snapshot: &[TeacherRecord], limit: usize) -> Vec<TeacherStanding> {
    let named = snapshot.iter().filter_map(|t| {
        t.name
            .as_deref()
            .map(|name| (name, t.points.amount().max(0.0)))
    });
    rank_by_name(named, limit)
        .into_iter()
        .enumerate()
        .map(|(i, (name, points))| TeacherStanding {
            rank: i + 1,
            name,
            points,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DocumentId, DollarAmount};

    fn teacher(name: Option<&str>, points: DollarAmount) -> TeacherRecord {
        TeacherRecord {
            id: DocumentId::generate(),
            name: name.map(str::to_string),
            points,
        }
    }

    #[test]
    fn ranks_descending() {
        let snapshot = vec![
            teacher(Some("Ortiz"), DollarAmount::from(10)),
            teacher(Some("Chen"), DollarAmount::Text("30".to_string())),
            teacher(Some("Park"), DollarAmount::from(20)),
        ];
        let board = build_teacher_leaderboard(&snapshot, 2);
        assert_eq!(
            board,
            vec![
                TeacherStanding {
                    rank: 1,
                    name: "Chen".to_string(),
                    points: 30.0
                },
                TeacherStanding {
                    rank: 2,
                    name: "Park".to_string(),
                    points: 20.0
                },
            ]
        );
    }

    #[test]
    fn skips_unnamed_and_clamps_negative() {
        let snapshot = vec![
            teacher(None, DollarAmount::from(99)),
            teacher(Some("Ortiz"), DollarAmount::from(-4)),
        ];
        let board = build_teacher_leaderboard(&snapshot, DEFAULT_TEACHER_LEADERBOARD_SIZE);
        assert_eq!(board.len(), 1);
        assert_eq!(board.first().map(|t| t.points), Some(0.0));
    }
}
