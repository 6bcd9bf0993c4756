//! Student write DTOs.

use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::ToSchema;

/// Request body for `POST /students/{id}/attendance`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceRequest {
    /// Day to record (`YYYY-MM-DD`). Defaults to today.
    #[serde(default)]
    pub date: Option<NaiveDate>,
    /// `true` for present, `false` for absent. Defaults to present.
    #[serde(default = "default_present")]
    pub present: bool,
}

fn default_present() -> bool {
    true
}

/// Request body for `POST /students/{id}/rewards`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RewardRequest {
    /// Amount in whole dollars. Negative values record a deduction.
    pub dollars: i64,
    /// Optional reason shown to parents.
    #[serde(default)]
    pub reason: Option<String>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn attendance_defaults_to_present_today() {
        let Ok(req) = serde_json::from_str::<AttendanceRequest>("{}") else {
            panic!("empty body should parse");
        };
        assert!(req.present);
        assert!(req.date.is_none());
    }

    #[test]
    fn attendance_parses_date() {
        let Ok(req) =
            serde_json::from_str::<AttendanceRequest>(r#"{"date":"2024-03-15","present":false}"#)
        else {
            panic!("body should parse");
        };
        assert_eq!(req.date, NaiveDate::from_ymd_opt(2024, 3, 15));
        assert!(!req.present);
    }
}
