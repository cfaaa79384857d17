//! OpenAI-compatible LLM classifier.
//!
//! Works with OpenAI's API and any compatible endpoint. One short
//! chat-completion call per message, hard timeout, defensive parsing of
//! the model's reply content.

use crate::{ClassificationError, ClassifiedIntent, IntentClassifier, WireIntent};
use aqari_core::config::ClassifierConfig;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const SYSTEM_PROMPT: &str = "You classify real-estate chat messages. Reply with ONE JSON object \
and nothing else: {\"intent\": \"analytical\" or \"lookup\", \"buildings\": [names mentioned], \
\"bedroom\": \"studio\"|\"1\"..\"5\"|null}. \"analytical\" means the sender wants a comparison, \
ROI or investment answer.";

/// OpenAI-compatible classifier backend.
pub struct LlmClassifier {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
}

impl LlmClassifier {
    /// Create from config values.
    pub fn from_config(config: &ClassifierConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Option<Vec<ChatChoice>>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    fn name(&self) -> &str {
        "llm"
    }

    async fn classify(&self, text: &str) -> Result<ClassifiedIntent, ClassificationError> {
        let body = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: text.to_string(),
                },
            ],
            temperature: 0.0,
        };

        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        debug!("classifier: POST {url} model={}", self.model);

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ClassificationError::Timeout
                } else {
                    ClassificationError::Http(e.to_string())
                }
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(ClassificationError::Http(format!("{status}: {text}")));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;

        let content = parsed
            .choices
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.message.as_ref())
            .and_then(|m| m.content.clone())
            .ok_or_else(|| ClassificationError::MalformedResponse("empty choices".to_string()))?;

        parse_intent_content(&content)
    }
}

/// Extract the JSON object from the model's reply content. Tolerates code
/// fences and surrounding prose; anything else is a malformed response.
fn parse_intent_content(content: &str) -> Result<ClassifiedIntent, ClassificationError> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    let candidate = match (start, end) {
        (Some(s), Some(e)) if e > s => &trimmed[s..=e],
        _ => {
            return Err(ClassificationError::MalformedResponse(format!(
                "no JSON object in: {trimmed}"
            )))
        }
    };

    let wire: WireIntent = serde_json::from_str(candidate)
        .map_err(|e| ClassificationError::MalformedResponse(e.to_string()))?;
    Ok(wire.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::IntentKind;

    #[test]
    fn test_parse_plain_json() {
        let c = parse_intent_content(
            r#"{"intent":"analytical","buildings":["tower a","tower b"],"bedroom":"2"}"#,
        )
        .unwrap();
        assert_eq!(c.intent, IntentKind::Analytical);
        assert_eq!(c.buildings, vec!["tower a", "tower b"]);
        assert_eq!(c.bedroom.as_deref(), Some("2"));
    }

    #[test]
    fn test_parse_fenced_json() {
        let c = parse_intent_content(
            "```json\n{\"intent\":\"lookup\",\"buildings\":[],\"bedroom\":null}\n```",
        )
        .unwrap();
        assert_eq!(c.intent, IntentKind::Lookup);
        assert!(c.bedroom.is_none());
    }

    #[test]
    fn test_parse_entities_alias() {
        let c = parse_intent_content(r#"{"intent":"compare","entities":["marina gate"]}"#).unwrap();
        assert_eq!(c.intent, IntentKind::Analytical);
        assert_eq!(c.buildings, vec!["marina gate"]);
    }

    #[test]
    fn test_parse_prose_is_malformed() {
        let err = parse_intent_content("I think the user wants a comparison.").unwrap_err();
        assert!(matches!(err, ClassificationError::MalformedResponse(_)));
    }

    #[test]
    fn test_unknown_intent_defaults_to_lookup() {
        let c = parse_intent_content(r#"{"intent":"greeting"}"#).unwrap();
        assert_eq!(c.intent, IntentKind::Lookup);
    }
}
