//! # schoolboard-gateway
//!
//! Live dashboard backend for a school attendance and rewards program.
//!
//! The gateway follows three collections of a document store (students,
//! notifications, and teacher progress) through live queries. Every
//! snapshot is run through the aggregation pipeline to rebuild the derived
//! views: the home-tab overview, one announcement feed per viewer role,
//! and the staff leaderboard. Views are served over REST and pushed to
//! WebSocket subscribers.
//!
//! ## Architecture
//!
//! ```text
//! Clients (HTTP, WebSocket)
//!     │
//!     ├── REST Handlers (api/)
//!     ├── WS Handler (ws/)
//!     │
//!     ├── DashboardService (service/)
//!     ├── EventBus (domain/)
//!     │
//!     ├── Aggregation pipeline (pipeline/)
//!     │
//!     └── DocumentStore live queries (domain/)
//! ```
//!
//! A failed live query never clears a view: the last good value stays
//! available and is marked stale until the next snapshot arrives.

pub mod api;
pub mod app_state;
pub mod config;
pub mod domain;
pub mod error;
pub mod pipeline;
pub mod service;
pub mod ws;
