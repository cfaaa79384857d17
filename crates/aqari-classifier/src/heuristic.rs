//! Static keyword heuristic for analytical intent.
//!
//! Runs before (and as the degrade path for) the LLM classifier. Keeping
//! the list small and unambiguous matters more than recall — a false
//! "analytical" drags the sender into the comparison dialogue.

use crate::{ClassifiedIntent, IntentKind};
use aqari_core::text;

/// Terms that mark a compare/ROI/investment question.
const ANALYTICAL_KW: &[&str] = &[
    "compare",
    "comparison",
    "vs",
    "versus",
    "roi",
    "investment",
    "invest",
    "yield",
    "best",
    "better",
];

/// Returns an analytical classification when the message carries one of
/// the trigger terms as a whole word, `None` otherwise. Building and
/// bedroom extraction is left to the matcher and the dialogue controller.
pub fn heuristic(message: &str) -> Option<ClassifiedIntent> {
    let norm = text::normalize(message);
    let hit = norm
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| ANALYTICAL_KW.contains(&token));
    hit.then(|| ClassifiedIntent {
        intent: IntentKind::Analytical,
        buildings: Vec::new(),
        bedroom: None,
    })
}
