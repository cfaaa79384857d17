use crate::{KeywordEntry, KnowledgeBase, StructuralType};
use aqari_core::text;
use std::sync::Arc;

/// Resolves a free-text message to knowledge-base entries.
///
/// Three stages in strict precedence, each breaking ties to the first row
/// in original sheet order:
/// 1. reference — the whole message is one 7-digit reference numeral;
/// 2. whole-word — a keyword appears token-bounded in the message;
/// 3. containment — keyword within message, or message within keyword.
#[derive(Clone)]
pub struct Matcher {
    kb: Arc<KnowledgeBase>,
}

impl Matcher {
    pub fn new(kb: Arc<KnowledgeBase>) -> Self {
        Self { kb }
    }

    /// Best single match, or `None`. The caller decides the fallback reply.
    pub fn matches(&self, message: &str) -> Option<&KeywordEntry> {
        let norm = text::normalize(message);

        if let Some(reference) = text::extract_reference(&norm) {
            if let Some(entry) = self.kb.entry_for_reference(&reference) {
                return Some(entry);
            }
        }

        if let Some(entry) = self.first_at(&norm, whole_word_hit) {
            return Some(entry);
        }
        self.first_at(&norm, containment_hit)
    }

    /// Every entry that matches at any stage, in sheet order, deduplicated
    /// (an entry appears once even if several of its keywords hit).
    pub fn match_all(&self, message: &str) -> Vec<&KeywordEntry> {
        let norm = text::normalize(message);
        let reference = text::extract_reference(&norm);

        self.kb
            .entries()
            .iter()
            .filter(|entry| {
                if let Some(ref r) = reference {
                    if entry.keywords.iter().any(|k| k == r) {
                        return true;
                    }
                }
                entry.keywords.iter().any(|k| {
                    whole_word_hit(&norm, k) || containment_hit(&norm, k)
                })
            })
            .collect()
    }

    /// Matches restricted to entries that name a building, used when an
    /// analytical message mentions one or more buildings by name.
    pub fn match_buildings(&self, message: &str) -> Vec<&KeywordEntry> {
        self.match_all(message)
            .into_iter()
            .filter(|e| {
                e.building_id.is_some()
                    || e.structural_type == StructuralType::AmbiguityMenu
            })
            .collect()
    }

    fn first_at(
        &self,
        norm: &str,
        stage: impl Fn(&str, &str) -> bool,
    ) -> Option<&KeywordEntry> {
        self.kb
            .entries()
            .iter()
            .find(|entry| entry.keywords.iter().any(|k| stage(norm, k)))
    }
}

/// Keyword present as a token-bounded phrase in the message.
fn whole_word_hit(message: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    let mut from = 0;
    while let Some(pos) = message[from..].find(keyword) {
        let start = from + pos;
        let end = start + keyword.len();
        let left_ok = message[..start]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let right_ok = message[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if left_ok && right_ok {
            return true;
        }
        // Step past one char, staying on a UTF-8 boundary.
        from = start
            + message[start..]
                .chars()
                .next()
                .map_or(1, |c| c.len_utf8());
    }
    false
}

/// Fallback stage: either side contains the other.
fn containment_hit(message: &str, keyword: &str) -> bool {
    !keyword.is_empty()
        && !message.is_empty()
        && (message.contains(keyword) || keyword.contains(message))
}
