use async_trait::async_trait;
use thiserror::Error;

#[async_trait]
pub trait LlmTrait: Send + Sync {
    async fn chat(&self, text: &str) -> anyhow::Result<String>;
}

/// Faults from the speech synthesis upstream. The status-carrying variant
/// keeps the raw response body so the handler can surface it verbatim.
#[derive(Debug, Error)]
pub enum TtsError {
    #[error("request timed out")]
    Timeout,
    #[error("{0}")]
    Network(String),
    #[error("{status} {body}")]
    Service { status: u16, body: String },
}

#[async_trait]
pub trait TtsTrait: Send + Sync {
    // Returns binary MP3 bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError>;
}
