//! # aqari-classifier
//!
//! Best-effort intent classification: a static keyword heuristic backed by
//! an optional OpenAI-compatible LLM call. Advisory only — every error
//! degrades to "no analytical intent" at the call site, never to a failed
//! request.

mod heuristic;
mod llm;

pub use heuristic::heuristic;
pub use llm::LlmClassifier;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// What the sender is asking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    /// Compare / ROI / investment question.
    Analytical,
    /// Plain keyword lookup.
    Lookup,
}

/// Structured classification result.
#[derive(Debug, Clone)]
pub struct ClassifiedIntent {
    pub intent: IntentKind,
    /// Building names mentioned, as extracted (not validated against the KB).
    pub buildings: Vec<String>,
    /// Bedroom entity, if the message carried one.
    pub bedroom: Option<String>,
}

impl ClassifiedIntent {
    pub fn lookup() -> Self {
        Self {
            intent: IntentKind::Lookup,
            buildings: Vec::new(),
            bedroom: None,
        }
    }
}

/// Typed classifier failures, so callers can tell "no intent" apart from
/// "classifier unreachable" when logging. Both degrade the same way.
#[derive(Debug, Error)]
pub enum ClassificationError {
    #[error("classifier request failed: {0}")]
    Http(String),

    #[error("classifier timed out")]
    Timeout,

    #[error("classifier returned malformed content: {0}")]
    MalformedResponse(String),

    #[error("classifier disabled")]
    Disabled,
}

/// An intent classification backend.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Classify one raw message.
    async fn classify(&self, text: &str) -> Result<ClassifiedIntent, ClassificationError>;
}

/// Wire shape the LLM is prompted to emit. Also usable by any webhook-style
/// classifier that returns the same JSON.
#[derive(Debug, Deserialize)]
pub(crate) struct WireIntent {
    #[serde(default)]
    pub intent: String,
    #[serde(default, alias = "entities")]
    pub buildings: Vec<String>,
    #[serde(default)]
    pub bedroom: Option<String>,
}

impl From<WireIntent> for ClassifiedIntent {
    fn from(wire: WireIntent) -> Self {
        let intent = match wire.intent.to_lowercase().as_str() {
            "analytical" | "compare" | "roi" | "investment" => IntentKind::Analytical,
            _ => IntentKind::Lookup,
        };
        Self {
            intent,
            buildings: wire.buildings,
            bedroom: wire.bedroom,
        }
    }
}
