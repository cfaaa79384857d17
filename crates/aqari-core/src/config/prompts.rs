use serde::{Deserialize, Serialize};

/// All user-facing fixed replies, overridable from `[prompts]` in config.
///
/// Templates use `{placeholder}` tokens replaced with plain string
/// substitution; a reply never fails to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompts {
    /// Reply when nothing in the knowledge base matches.
    #[serde(default = "default_not_found")]
    pub not_found: String,
    /// Appended guidance when a disambiguation answer is not a listed reference.
    #[serde(default = "default_invalid_reference")]
    pub invalid_reference: String,
    /// Prompt for the bedroom type once all buildings are resolved.
    #[serde(default = "default_ask_bedroom")]
    pub ask_bedroom: String,
    /// Re-prompt when no bedroom type could be read from the answer.
    #[serde(default = "default_bedroom_retry")]
    pub bedroom_retry: String,
    /// Reply when a building/bedroom combination has no ROI row.
    /// Placeholders: `{building}`, `{bedroom}`.
    #[serde(default = "default_data_unavailable")]
    pub data_unavailable: String,
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            not_found: default_not_found(),
            invalid_reference: default_invalid_reference(),
            ask_bedroom: default_ask_bedroom(),
            bedroom_retry: default_bedroom_retry(),
            data_unavailable: default_data_unavailable(),
        }
    }
}

fn default_not_found() -> String {
    "Sorry, I couldn't find anything for that. Try a building name, an area, \
     or a 7-digit reference number."
        .to_string()
}

fn default_invalid_reference() -> String {
    "That reference isn't one of the listed options. Please reply with one \
     of the numbers below."
        .to_string()
}

fn default_ask_bedroom() -> String {
    "Which bedroom type are you interested in? (studio, 1, 2, 3, 4 or 5)".to_string()
}

fn default_bedroom_retry() -> String {
    "I didn't catch a bedroom type. Reply with studio, or a number from 1 to 5 \
     (e.g. \"2 bedroom\")."
        .to_string()
}

fn default_data_unavailable() -> String {
    "ROI data for {building} ({bedroom} bedroom) is not available yet.".to_string()
}
