//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage, WsMessageType};
use super::subscription::SubscriptionManager;
use crate::domain::{DashboardEvent, Topic, ViewerRole};
use crate::service::DashboardService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<DashboardEvent>,
    dashboard: Arc<DashboardService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    'conn: loop {
        tokio::select! {
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        for reply in handle_text_message(&text, &mut subs, &dashboard).await {
                            let json = serde_json::to_string(&reply).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break 'conn;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            event = event_rx.recv() => {
                match event {
                    Ok(dashboard_event) => {
                        if subs.matches(dashboard_event.topic()) {
                            let json = serde_json::to_string(&event_message(&dashboard_event))
                                .unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

fn event_message(event: &DashboardEvent) -> WsMessage {
    WsMessage::server(
        uuid::Uuid::new_v4().to_string(),
        WsMessageType::Event,
        serde_json::to_value(event).unwrap_or_default(),
    )
}

/// Handles a text message from the client, returning the replies to send
/// in order.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    dashboard: &DashboardService,
) -> Vec<WsMessage> {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return vec![WsMessage::error(String::new(), 400, "malformed JSON")];
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return vec![WsMessage::error(msg.id, 404, "unknown command")];
    };

    match command {
        WsCommand::Subscribe { topics } => {
            let parsed = ParsedTopics::from_raw(&topics);
            subs.subscribe(&parsed.topics, parsed.wildcard);
            let mut replies = vec![WsMessage::server(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "subscribed": parsed.names(),
                    "rejected": parsed.rejected,
                    "count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )];
            let initial: Vec<Topic> = if parsed.wildcard {
                all_view_topics()
            } else {
                parsed.topics
            };
            for topic in initial {
                if let Some(event) = current_event(dashboard, topic).await {
                    replies.push(event_message(&event));
                }
            }
            replies
        }
        WsCommand::Unsubscribe { topics } => {
            let parsed = ParsedTopics::from_raw(&topics);
            subs.unsubscribe(&parsed.topics, parsed.wildcard);
            vec![WsMessage::server(
                msg.id,
                WsMessageType::Response,
                serde_json::json!({
                    "unsubscribed": parsed.names(),
                    "rejected": parsed.rejected,
                    "remaining_count": subs.count(),
                    "wildcard": subs.is_subscribed_all(),
                }),
            )]
        }
    }
}

/// Topic strings of one command, sorted into valid, wildcard, and unknown.
#[derive(Debug, Default)]
struct ParsedTopics {
    topics: Vec<Topic>,
    wildcard: bool,
    rejected: Vec<String>,
}

impl ParsedTopics {
    fn from_raw(raw: &[String]) -> Self {
        let mut parsed = Self::default();
        for name in raw {
            let name = name.trim();
            if name == "*" {
                parsed.wildcard = true;
            } else {
                match name.parse::<Topic>() {
                    Ok(topic) => parsed.topics.push(topic),
                    Err(_) => parsed.rejected.push(name.to_string()),
                }
            }
        }
        parsed
    }

    fn names(&self) -> Vec<String> {
        self.topics.iter().map(ToString::to_string).collect()
    }
}

fn all_view_topics() -> Vec<Topic> {
    let mut topics = vec![Topic::Overview, Topic::Teachers];
    topics.extend(ViewerRole::ALL.into_iter().map(Topic::Announcements));
    topics
}

/// Current view of `topic` as an event, if one has been computed.
async fn current_event(dashboard: &DashboardService, topic: Topic) -> Option<DashboardEvent> {
    match topic {
        Topic::Overview => dashboard.overview().await.ok().map(|view| {
            DashboardEvent::OverviewUpdated {
                overview: view.data,
                timestamp: view.updated_at,
            }
        }),
        Topic::Announcements(role) => dashboard.announcements(role).await.ok().map(|view| {
            DashboardEvent::AnnouncementsUpdated {
                role,
                announcements: view.data,
                timestamp: view.updated_at,
            }
        }),
        Topic::Teachers => dashboard.teacher_leaderboard().await.ok().map(|view| {
            DashboardEvent::TeacherLeaderboardUpdated {
                standings: view.data,
                timestamp: view.updated_at,
            }
        }),
        Topic::Status => None,
    }
}
