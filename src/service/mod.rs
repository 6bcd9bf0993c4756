//! Service layer: live dashboard views and dashboard writes.

pub mod dashboard_service;
pub mod live_views;

pub use dashboard_service::{DashboardService, ViewSettings, ViewState};
pub use live_views::LiveViews;
