//! Message processing pipeline — the main handle_message flow.

use super::Gateway;
use aqari_core::message::{IncomingMessage, MessageMetadata, OutgoingMessage};
use aqari_session::DialogueMode;
use std::time::Instant;
use tracing::info;

impl Gateway {
    /// Process a single incoming message and produce the reply.
    ///
    /// Business failures (no match, unavailable data, bad reference) come
    /// back as ordinary reply text; this function does not fail.
    pub async fn handle_message(&self, incoming: &IncomingMessage) -> OutgoingMessage {
        let start = Instant::now();
        let preview = if incoming.text.chars().count() > 60 {
            let truncated: String = incoming.text.chars().take(60).collect();
            format!("{truncated}...")
        } else {
            incoming.text.clone()
        };
        info!("[{}] says: {}", incoming.sender_id, preview);

        // Eager expiry: no stale session may be acted upon.
        self.sessions.sweep().await;

        // One in-flight state transition per sender.
        let _guard = self.sessions.lock_sender(&incoming.sender_id).await;

        let (text, source) = match self.sessions.get(&incoming.sender_id).await {
            Some(session) => {
                let reply = match session.mode {
                    DialogueMode::Disambiguating => {
                        self.continue_disambiguation(session, &incoming.text).await
                    }
                    DialogueMode::AwaitingBedroom => {
                        self.continue_bedroom(session, &incoming.text).await
                    }
                };
                (reply, "dialogue")
            }
            None => self.answer_fresh(incoming).await,
        };

        OutgoingMessage {
            text,
            metadata: MessageMetadata {
                source: source.to_string(),
                processing_time_ms: start.elapsed().as_millis() as u64,
            },
        }
    }
}
