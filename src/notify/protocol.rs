use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Client -> Server messages ──

/// Messages the client sends to the server over WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keep-alive from the browser; answered with `pong`.
    Ping,
}

// ── Server -> Client messages ──

/// Events pushed to a connected user, serialized as `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// The connection is registered and will receive notifications.
    #[serde(rename_all = "camelCase")]
    Registered { user_id: Uuid },
    /// One of the user's bids was accepted and the gig is now in progress.
    BidAccepted(BidAccepted),
    Pong,
    /// The client sent something the server could not understand.
    Error { message: String },
}

/// Payload of the `bid_accepted` event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BidAccepted {
    pub message: String,
    pub gig_title: String,
    pub budget: f64,
    pub bid_id: Uuid,
    pub bid_price: f64,
    pub timestamp: DateTime<Utc>,
}
