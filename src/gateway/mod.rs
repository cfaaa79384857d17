//! Gateway — the dialogue controller connecting the matcher, the intent
//! classifier, and the session store.
//!
//! One entry point, [`Gateway::handle_message`]: sweeps expired sessions,
//! serializes per-sender processing, then either continues an open
//! dialogue or classifies and answers a fresh message.

mod dialogue;
mod pipeline;
mod report;

#[cfg(test)]
mod tests;

use aqari_classifier::IntentClassifier;
use aqari_core::config::Prompts;
use aqari_kb::{KnowledgeBase, Matcher};
use aqari_session::SessionStore;
use std::sync::Arc;

/// The central dialogue controller.
pub struct Gateway {
    pub(crate) kb: Arc<KnowledgeBase>,
    pub(crate) matcher: Matcher,
    pub(crate) sessions: SessionStore,
    /// Optional LLM backend; the static heuristic always runs first.
    pub(crate) classifier: Option<Arc<dyn IntentClassifier>>,
    pub(crate) prompts: Prompts,
}

impl Gateway {
    pub fn new(
        kb: Arc<KnowledgeBase>,
        sessions: SessionStore,
        classifier: Option<Arc<dyn IntentClassifier>>,
        prompts: Prompts,
    ) -> Self {
        let matcher = Matcher::new(kb.clone());
        Self {
            kb,
            matcher,
            sessions,
            classifier,
            prompts,
        }
    }
}
