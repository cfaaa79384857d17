//! Dialogue state machine: intent entry, disambiguation, slot filling.

use super::Gateway;
use aqari_classifier::{ClassifiedIntent, IntentKind};
use aqari_core::{message::IncomingMessage, text};
use aqari_kb::{KeywordEntry, StructuralType};
use aqari_session::{AmbiguityCandidate, DialogueMode, SessionState};
use std::collections::VecDeque;
use tracing::{debug, warn};

impl Gateway {
    /// Handle a message from a sender with no open dialogue.
    pub(super) async fn answer_fresh(&self, incoming: &IncomingMessage) -> (String, &'static str) {
        let intent = self.classify(&incoming.text).await;

        if intent.intent == IntentKind::Analytical {
            if let Some(reply) = self.start_analytical(incoming, &intent).await {
                return (reply, "dialogue");
            }
            debug!("analytical intent but no buildings recognized, falling back to lookup");
        }

        self.plain_lookup(incoming).await
    }

    /// Heuristic first, then the LLM backend if configured. Every backend
    /// error degrades to a plain-lookup classification.
    async fn classify(&self, message: &str) -> ClassifiedIntent {
        if let Some(hit) = aqari_classifier::heuristic(message) {
            return hit;
        }
        match &self.classifier {
            Some(classifier) => match classifier.classify(message).await {
                Ok(intent) => intent,
                Err(e) => {
                    warn!("classifier '{}' degraded to lookup: {e}", classifier.name());
                    ClassifiedIntent::lookup()
                }
            },
            None => ClassifiedIntent::lookup(),
        }
    }

    /// Enter the comparison flow from an analytical message. Returns `None`
    /// when no building can be recognized, letting the caller fall back to
    /// a plain lookup.
    async fn start_analytical(
        &self,
        incoming: &IncomingMessage,
        intent: &ClassifiedIntent,
    ) -> Option<String> {
        let mut hits: Vec<&KeywordEntry> = self.matcher.match_buildings(&incoming.text);

        // The matcher saw nothing, but the classifier may have pulled out
        // building names the message only alluded to.
        if hits.is_empty() {
            for name in &intent.buildings {
                for entry in self.matcher.match_buildings(name) {
                    hits.push(entry);
                }
            }
        }

        let mut resolved: Vec<String> = Vec::new();
        let mut pending: VecDeque<AmbiguityCandidate> = VecDeque::new();

        for entry in hits {
            match entry.structural_type {
                StructuralType::AmbiguityMenu => {
                    if let Some(candidate) = candidate_from(entry) {
                        pending.push_back(candidate);
                    }
                }
                _ => {
                    if let Some(id) = &entry.building_id {
                        if !resolved.contains(id) {
                            resolved.push(id.clone());
                        }
                    }
                }
            }
        }

        // The comparison takes one or two buildings; extras are dropped in
        // arrival order.
        while resolved.len() + pending.len() > 2 {
            if pending.pop_back().is_none() {
                resolved.truncate(2);
            }
        }

        if resolved.is_empty() && pending.is_empty() {
            return None;
        }

        if pending.is_empty() {
            // Bedroom supplied up front (trusting only the classifier's
            // structured entity, not a re-scan of the raw message).
            if let Some(bed) = intent.bedroom.as_deref().and_then(text::extract_bedroom) {
                return Some(self.compose_report(&resolved, &bed));
            }

            let mut session =
                SessionState::new(&incoming.sender_id, DialogueMode::AwaitingBedroom);
            session.resolved_building_ids = resolved;
            self.sessions.put(session).await;
            return Some(self.prompts.ask_bedroom.clone());
        }

        let first_menu = pending
            .front()
            .map(|c| c.menu_text.clone())
            .unwrap_or_default();
        let mut session = SessionState::new(&incoming.sender_id, DialogueMode::Disambiguating);
        session.pending = pending;
        session.resolved_building_ids = resolved;
        self.sessions.put(session).await;
        Some(first_menu)
    }

    /// Plain keyword lookup. Ambiguity-menu hits anywhere in the message
    /// open a dialogue holding the full pending queue, with unambiguous
    /// profile hits from the same message recorded as pre-resolved.
    async fn plain_lookup(&self, incoming: &IncomingMessage) -> (String, &'static str) {
        let mut pending: VecDeque<AmbiguityCandidate> = VecDeque::new();
        let mut resolved: Vec<String> = Vec::new();

        for entry in self.matcher.match_all(&incoming.text) {
            match entry.structural_type {
                StructuralType::AmbiguityMenu => {
                    if let Some(candidate) = candidate_from(entry) {
                        pending.push_back(candidate);
                    }
                }
                _ => {
                    if let Some(id) = &entry.building_id {
                        if !resolved.contains(id) {
                            resolved.push(id.clone());
                        }
                    }
                }
            }
        }

        if !pending.is_empty() {
            let menu = pending
                .front()
                .map(|c| c.menu_text.clone())
                .unwrap_or_default();
            let mut session =
                SessionState::new(&incoming.sender_id, DialogueMode::Disambiguating);
            session.pending = pending;
            session.resolved_building_ids = resolved;
            self.sessions.put(session).await;
            return (menu, "dialogue");
        }

        // No ambiguity anywhere: answer from the best single hit. Covers
        // the unusable-menu case too (a menu listing no references reads
        // as a plain reply).
        match self.matcher.matches(&incoming.text) {
            Some(entry) if !entry.reply_text.is_empty() => (entry.reply_text.clone(), "lookup"),
            _ => (self.prompts.not_found.clone(), "fallback"),
        }
    }

    /// `DISAMBIGUATING`: the answer must be one of the head candidate's
    /// listed references. Anything else re-prompts, session unchanged.
    pub(super) async fn continue_disambiguation(
        &self,
        mut session: SessionState,
        message: &str,
    ) -> String {
        let head_menu = session
            .pending
            .front()
            .map(|c| c.menu_text.clone())
            .unwrap_or_default();

        let reference = match text::extract_reference(message) {
            Some(r) => r,
            None => {
                self.sessions.put(session).await;
                return format!("{}\n\n{head_menu}", self.prompts.invalid_reference);
            }
        };

        let valid = session
            .pending
            .front()
            .is_some_and(|c| c.references.contains(&reference));
        if !valid {
            self.sessions.put(session).await;
            return format!("{}\n\n{head_menu}", self.prompts.invalid_reference);
        }

        let building_id = self.building_for_reference(&reference);
        if let Some(mut done) = session.pending.pop_front() {
            done.resolved = true;
            done.building_id = Some(building_id.clone());
        }
        session.resolved_building_ids.push(building_id);

        if let Some(next) = session.pending.front() {
            let menu = next.menu_text.clone();
            self.sessions.put(session).await;
            return menu;
        }

        session.mode = DialogueMode::AwaitingBedroom;
        self.sessions.put(session).await;
        self.prompts.ask_bedroom.clone()
    }

    /// `AWAITING_BEDROOM`: extract the bedroom type, then run the report
    /// and close the dialogue.
    pub(super) async fn continue_bedroom(&self, session: SessionState, message: &str) -> String {
        let bedroom = match text::extract_bedroom(message) {
            Some(b) => b,
            None => {
                self.sessions.put(session).await;
                return self.prompts.bedroom_retry.clone();
            }
        };

        let reply = self.compose_report(&session.resolved_building_ids, &bedroom);
        self.sessions.clear(&session.sender_id).await;
        reply
    }

    /// Building id for a chosen reference: taken from the profile row that
    /// owns the reference, falling back to the reference itself.
    fn building_for_reference(&self, reference: &str) -> String {
        self.kb
            .entry_for_reference(reference)
            .and_then(|e| e.building_id.clone())
            .unwrap_or_else(|| reference.to_string())
    }
}

/// Snapshot an ambiguity-menu row into a candidate. Menus listing no
/// reference numbers are unusable and yield `None`.
fn candidate_from(entry: &KeywordEntry) -> Option<AmbiguityCandidate> {
    let references = text::references_in(&entry.reply_text);
    if references.is_empty() {
        debug!("ambiguity menu without references, skipping");
        return None;
    }
    Some(AmbiguityCandidate {
        query: entry.keywords.first().cloned().unwrap_or_default(),
        menu_text: entry.reply_text.clone(),
        references,
        building_id: None,
        resolved: false,
    })
}
