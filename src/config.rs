//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::pipeline::{
    DEFAULT_ANNOUNCEMENT_LIMIT, DEFAULT_LEADERBOARD_SIZE, DEFAULT_TEACHER_LEADERBOARD_SIZE,
};

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable lines.
    Text,
    /// One JSON object per line.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:3000`).
    pub listen_addr: SocketAddr,

    /// Capacity of the EventBus broadcast channel.
    pub event_bus_capacity: usize,

    /// Maximum announcements per dashboard feed.
    pub announcement_limit: usize,

    /// Rows on the student leaderboard of the overview.
    pub leaderboard_size: usize,

    /// Rows on the staff leaderboard.
    pub teacher_leaderboard_size: usize,

    /// Optional JSON file preloaded into the in-memory store.
    pub seed_file: Option<PathBuf>,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            event_bus_capacity: 1024,
            announcement_limit: DEFAULT_ANNOUNCEMENT_LIMIT,
            leaderboard_size: DEFAULT_LEADERBOARD_SIZE,
            teacher_leaderboard_size: DEFAULT_TEACHER_LEADERBOARD_SIZE,
            seed_file: None,
            log_format: LogFormat::Text,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or cannot be
    /// parsed. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`].
    pub fn from_env() -> Result<Self, std::net::AddrParseError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is present but malformed.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, std::net::AddrParseError> {
        let defaults = Self::default();

        let listen_addr = match lookup("LISTEN_ADDR") {
            Some(raw) => raw.parse()?,
            None => defaults.listen_addr,
        };

        let parse = |key: &str, default: usize| -> usize {
            lookup(key)
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(default)
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") | Some("JSON") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            listen_addr,
            event_bus_capacity: parse("EVENT_BUS_CAPACITY", defaults.event_bus_capacity),
            announcement_limit: parse("ANNOUNCEMENT_LIMIT", defaults.announcement_limit),
            leaderboard_size: parse("LEADERBOARD_SIZE", defaults.leaderboard_size),
            teacher_leaderboard_size: parse(
                "TEACHER_LEADERBOARD_SIZE",
                defaults.teacher_leaderboard_size,
            ),
            seed_file: lookup("SEED_FILE")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            log_format,
        })
    }
}
