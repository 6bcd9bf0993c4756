//! WebSocket layer: connection handling, message routing, subscriptions.
//!
//! The WebSocket endpoint at `/ws` pushes dashboard events to clients that
//! subscribed to their topic.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
