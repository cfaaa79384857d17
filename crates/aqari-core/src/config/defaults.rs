//! Default value functions used by serde for config deserialization.

pub fn default_name() -> String {
    "Aqari".to_string()
}

pub fn default_log_level() -> String {
    "info".to_string()
}

pub fn default_kb_path() -> String {
    "data/knowledge_base.csv".to_string()
}

pub fn default_session_ttl() -> u64 {
    300
}

pub fn default_classifier_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

pub fn default_classifier_model() -> String {
    "gpt-4o-mini".to_string()
}

pub fn default_classifier_timeout() -> u64 {
    8
}

pub fn default_api_host() -> String {
    "0.0.0.0".to_string()
}

pub fn default_api_port() -> u16 {
    8080
}

pub fn default_response_format() -> String {
    "json".to_string()
}
