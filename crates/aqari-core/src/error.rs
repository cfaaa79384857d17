use thiserror::Error;

/// Top-level error type for Aqari.
#[derive(Debug, Error)]
pub enum AqariError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Knowledge base loading/lookup error.
    #[error("knowledge base error: {0}")]
    Kb(String),

    /// HTTP API error.
    #[error("api error: {0}")]
    Api(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
