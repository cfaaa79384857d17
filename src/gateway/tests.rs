use super::*;
use aqari_classifier::{ClassificationError, ClassifiedIntent, IntentKind};
use aqari_core::message::IncomingMessage;
use aqari_kb::RawRow;
use aqari_session::{DialogueMode, SystemClock};
use async_trait::async_trait;

// -----------------------------------------------------------------------
// Fixtures
// -----------------------------------------------------------------------

fn row(kw: &str, reply: &str) -> RawRow {
    RawRow {
        key_word: Some(kw.to_string()),
        report: Some(reply.to_string()),
        ..Default::default()
    }
}

fn menu_row(kw: &str, reply: &str) -> RawRow {
    let mut r = row(kw, reply);
    r.structural_type = Some("ambiguity_menu".to_string());
    r
}

fn profile_row(kw: &str, building_id: &str, name: &str) -> RawRow {
    let mut r = row(kw, &format!("{name} profile"));
    r.building_id = Some(building_id.to_string());
    r.building_name = Some(name.to_string());
    r
}

fn report_row(building_id: &str, name: &str, bedroom: &str, roi: &str, rent: Option<&str>) -> RawRow {
    let mut r = row(&format!("{building_id}-{bedroom}-report"), "");
    r.structural_type = Some("report".to_string());
    r.building_id = Some(building_id.to_string());
    r.building_name = Some(name.to_string());
    r.bedroom_type = Some(bedroom.to_string());
    r.gross_roi = Some(roi.to_string());
    r.median_rent = rent.map(str::to_string);
    r
}

fn test_kb() -> Arc<KnowledgeBase> {
    Arc::new(KnowledgeBase::build(vec![
        row("1006828, welcome", "Welcome"),
        menu_row(
            "tower a",
            "Which Tower A?\n1) 1008123 - Tower A Marina\n2) 1008124 - Tower A JLT",
        ),
        menu_row(
            "tower b",
            "Which Tower B?\n1) 1009001 - Tower B Downtown\n2) 1009002 - Tower B Creek",
        ),
        profile_row("1008123", "TAM", "Tower A Marina"),
        profile_row("1008124", "TAJ", "Tower A JLT"),
        profile_row("1009001", "TBD", "Tower B Downtown"),
        profile_row("1009002", "TBC", "Tower B Creek"),
        profile_row("marina gate", "MG", "Marina Gate"),
        report_row("TAM", "Tower A Marina", "2", "7.2%", Some("AED 120,000")),
        report_row("TBD", "Tower B Downtown", "2", "6.5%", None),
        report_row("TAM", "Tower A Marina", "studio", "8.0%", None),
        report_row("MG", "Marina Gate", "1", "6.0%", None),
    ]))
}

fn gateway(classifier: Option<Arc<dyn IntentClassifier>>) -> Gateway {
    let sessions = SessionStore::new(300, Arc::new(SystemClock));
    Gateway::new(test_kb(), sessions, classifier, Default::default())
}

async fn say(gw: &Gateway, sender: &str, text: &str) -> String {
    gw.handle_message(&IncomingMessage::new(sender, text)).await.text
}

// -----------------------------------------------------------------------
// Mock classifiers
// -----------------------------------------------------------------------

/// Always errors, simulating an unreachable classifier service.
struct FailingClassifier;

#[async_trait]
impl IntentClassifier for FailingClassifier {
    fn name(&self) -> &str {
        "failing"
    }

    async fn classify(&self, _text: &str) -> Result<ClassifiedIntent, ClassificationError> {
        Err(ClassificationError::Http("connection refused".to_string()))
    }
}

/// Returns a canned result.
struct StubClassifier(ClassifiedIntent);

#[async_trait]
impl IntentClassifier for StubClassifier {
    fn name(&self) -> &str {
        "stub"
    }

    async fn classify(&self, _text: &str) -> Result<ClassifiedIntent, ClassificationError> {
        Ok(self.0.clone())
    }
}

// -----------------------------------------------------------------------
// End-to-end scenarios
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_exact_reference_lookup() {
    let gw = gateway(None);
    assert_eq!(say(&gw, "+971501111111", "1006828").await, "Welcome");
}

#[tokio::test]
async fn test_full_comparison_dialogue() {
    let gw = gateway(None);
    let sender = "+971500000000";

    // Analytical message with two ambiguous towers → first menu.
    let r1 = say(&gw, sender, "compare tower a and tower b").await;
    assert!(r1.contains("Which Tower A?"), "got: {r1}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.mode, DialogueMode::Disambiguating);
    assert_eq!(s.pending.len(), 2);

    // Valid reference for candidate 1 → candidate 2's menu (FIFO).
    let r2 = say(&gw, sender, "1008123").await;
    assert!(r2.contains("Which Tower B?"), "got: {r2}");

    // Valid reference for candidate 2 → bedroom prompt.
    let r3 = say(&gw, sender, "1009001").await;
    assert!(r3.contains("bedroom type"), "got: {r3}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.mode, DialogueMode::AwaitingBedroom);
    assert_eq!(s.resolved_building_ids, vec!["TAM", "TBD"]);

    // Bedroom answer → comparison with both figures and a winner.
    let r4 = say(&gw, sender, "2 bedroom").await;
    assert!(r4.contains("7.2%"), "got: {r4}");
    assert!(r4.contains("6.5%"), "got: {r4}");
    assert!(r4.contains("Tower A Marina comes out ahead"), "got: {r4}");

    // Session cleared; an unrelated message starts fresh.
    assert!(gw.sessions.get(sender).await.is_none());
    assert_eq!(say(&gw, sender, "1006828").await, "Welcome");
}

#[tokio::test]
async fn test_unknown_text_with_failing_classifier() {
    let gw = gateway(Some(Arc::new(FailingClassifier)));
    let reply = say(&gw, "+971502222222", "blorp zzz qqq").await;
    assert_eq!(reply, gw.prompts.not_found);
    assert!(gw.sessions.get("+971502222222").await.is_none());
}

// -----------------------------------------------------------------------
// Dialogue details
// -----------------------------------------------------------------------

#[tokio::test]
async fn test_invalid_reference_reprompts_same_menu() {
    let gw = gateway(None);
    let sender = "s";

    say(&gw, sender, "compare tower a and tower b").await;

    // A reference from the *other* menu is not valid for candidate 1.
    let r = say(&gw, sender, "1009001").await;
    assert!(r.contains(&gw.prompts.invalid_reference), "got: {r}");
    assert!(r.contains("Which Tower A?"), "got: {r}");

    // Non-reference text re-prompts too; queue is untouched.
    let r = say(&gw, sender, "the first one").await;
    assert!(r.contains("Which Tower A?"), "got: {r}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.pending.len(), 2);
    assert_eq!(s.pending[0].query, "tower a");
}

#[tokio::test]
async fn test_missing_bedroom_reprompts() {
    let gw = gateway(None);
    let sender = "s";

    say(&gw, sender, "roi for marina gate").await;
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.mode, DialogueMode::AwaitingBedroom);
    assert_eq!(s.resolved_building_ids, vec!["MG"]);

    let r = say(&gw, sender, "the big one").await;
    assert_eq!(r, gw.prompts.bedroom_retry);
    assert!(gw.sessions.get(sender).await.is_some());

    let r = say(&gw, sender, "one bed").await;
    assert!(r.contains("6%"), "got: {r}");
    assert!(gw.sessions.get(sender).await.is_none());
}

#[tokio::test]
async fn test_plain_ambiguous_lookup_opens_dialogue() {
    let gw = gateway(None);
    let sender = "s";

    let r = say(&gw, sender, "tower a").await;
    assert!(r.contains("Which Tower A?"), "got: {r}");

    let r = say(&gw, sender, "1008124").await;
    assert!(r.contains("bedroom type"), "got: {r}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.resolved_building_ids, vec!["TAJ"]);
}

#[tokio::test]
async fn test_bedroom_supplied_up_front_skips_session() {
    let intent = ClassifiedIntent {
        intent: IntentKind::Analytical,
        buildings: vec!["marina gate".to_string()],
        bedroom: Some("1".to_string()),
    };
    let gw = gateway(Some(Arc::new(StubClassifier(intent))));

    // No heuristic trigger word, so the stub classifier decides.
    let r = say(&gw, "s", "thinking about marina gate for a while now").await;
    assert!(r.contains("Marina Gate"), "got: {r}");
    assert!(r.contains("6%"), "got: {r}");
    assert!(gw.sessions.get("s").await.is_none());
}

#[tokio::test]
async fn test_data_unavailable_is_in_band() {
    let gw = gateway(None);
    let sender = "s";

    say(&gw, sender, "roi for marina gate").await;
    // Marina Gate has no 3-bedroom row.
    let r = say(&gw, sender, "3 bedroom").await;
    assert!(r.contains("not available"), "got: {r}");
    assert!(r.contains("Marina Gate"), "got: {r}");
    assert!(gw.sessions.get(sender).await.is_none());
}

#[tokio::test]
async fn test_plain_message_queues_all_ambiguities() {
    let gw = gateway(None);
    let sender = "s";

    // No analytical keyword — still a dialogue, with both menus queued.
    let r = say(&gw, sender, "tower a and tower b").await;
    assert!(r.contains("Which Tower A?"), "got: {r}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.mode, DialogueMode::Disambiguating);
    assert_eq!(s.pending.len(), 2);
    assert_eq!(s.pending[0].query, "tower a");
    assert_eq!(s.pending[1].query, "tower b");

    let r = say(&gw, sender, "1008123").await;
    assert!(r.contains("Which Tower B?"), "got: {r}");
}

#[tokio::test]
async fn test_plain_message_preresolves_profiles() {
    let gw = gateway(None);
    let sender = "s";

    // The unambiguous building rides along as already resolved.
    let r = say(&gw, sender, "tower a and marina gate").await;
    assert!(r.contains("Which Tower A?"), "got: {r}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.resolved_building_ids, vec!["MG"]);
    assert_eq!(s.pending.len(), 1);

    let r = say(&gw, sender, "1008123").await;
    assert!(r.contains("bedroom type"), "got: {r}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.resolved_building_ids, vec!["MG", "TAM"]);
}

#[tokio::test]
async fn test_reply_source_tags() {
    let gw = gateway(None);

    let out = gw
        .handle_message(&IncomingMessage::new("s1", "1006828"))
        .await;
    assert_eq!(out.metadata.source, "lookup");

    let out = gw
        .handle_message(&IncomingMessage::new("s2", "blorp zzz"))
        .await;
    assert_eq!(out.metadata.source, "fallback");

    let out = gw
        .handle_message(&IncomingMessage::new("s3", "tower a"))
        .await;
    assert_eq!(out.metadata.source, "dialogue");
}

#[tokio::test]
async fn test_plain_lookup_no_session() {
    let gw = gateway(None);
    let r = say(&gw, "s", "marina gate").await;
    assert_eq!(r, "Marina Gate profile");
    assert!(gw.sessions.get("s").await.is_none());
}

#[tokio::test]
async fn test_mixed_ambiguous_and_resolved_buildings() {
    let gw = gateway(None);
    let sender = "s";

    // "marina gate" is unambiguous and pre-resolves; "tower a" still needs
    // a reference pick.
    let r = say(&gw, sender, "compare marina gate vs tower a").await;
    assert!(r.contains("Which Tower A?"), "got: {r}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.resolved_building_ids, vec!["MG"]);
    assert_eq!(s.pending.len(), 1);

    let r = say(&gw, sender, "1008123").await;
    assert!(r.contains("bedroom type"), "got: {r}");
    let s = gw.sessions.get(sender).await.unwrap();
    assert_eq!(s.resolved_building_ids, vec!["MG", "TAM"]);
}

#[tokio::test]
async fn test_sender_dialogues_are_independent() {
    let gw = gateway(None);

    say(&gw, "alice", "tower a").await;
    assert!(gw.sessions.get("alice").await.is_some());

    // Bob's plain lookup is untouched by Alice's open dialogue.
    assert_eq!(say(&gw, "bob", "1006828").await, "Welcome");
    assert!(gw.sessions.get("bob").await.is_none());
    assert!(gw.sessions.get("alice").await.is_some());
}
