use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An incoming message from the webhook.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub id: Uuid,
    /// Sender identifier — a phone number for WhatsApp-style senders,
    /// or any opaque id. Used as the session key.
    pub sender_id: String,
    /// Message text content.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(sender_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id: sender_id.into(),
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An outgoing reply to send back to the sender.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutgoingMessage {
    pub text: String,
    pub metadata: MessageMetadata,
}

/// Metadata about how a reply was produced.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MessageMetadata {
    /// Which path produced the reply ("lookup", "dialogue", "fallback").
    pub source: String,
    /// Wall-clock processing time in milliseconds.
    pub processing_time_ms: u64,
}
