//! Aggregation pipeline: pure functions from a snapshot to a derived view.
//!
//! Nothing here holds state or performs I/O. Each function is called with
//! the full snapshot a live query just delivered and recomputes its output
//! from scratch; the caller replaces its previous result wholesale.
//! Malformed fields never produce errors, they degrade to zero or empty.

pub mod announcements;
pub mod clock;
pub mod leaderboard;
pub mod overview;
pub mod progress;

pub use announcements::{AnnouncementView, DEFAULT_ANNOUNCEMENT_LIMIT, filter_announcements};
pub use clock::{Clock, FixedClock, SystemClock, date_key};
pub use leaderboard::{DEFAULT_TEACHER_LEADERBOARD_SIZE, TeacherStanding, build_teacher_leaderboard};
pub use overview::{
    DEFAULT_LEADERBOARD_SIZE, LeaderboardEntry, OverviewSummary, build_overview,
    build_overview_with_limit, resolve_dollar_total,
};
pub use progress::{RewardLine, StudentProgress, student_progress};
