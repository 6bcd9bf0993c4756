//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::service::DashboardService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Dashboard service holding the live views and store writes.
    pub dashboard: Arc<DashboardService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
}

impl AppState {
    /// Wraps a service, sharing its event bus with the WebSocket layer.
    #[must_use]
    pub fn new(dashboard: Arc<DashboardService>) -> Self {
        let event_bus = dashboard.event_bus().clone();
        Self {
            dashboard,
            event_bus,
        }
    }
}
