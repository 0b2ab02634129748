use crate::config::ServerConfig;
use crate::services::{llm::openai::OpenAiLlm, tts::elevenlabs::ElevenLabsTts};
use crate::traits::{LlmTrait, TtsTrait};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub llm: Arc<dyn LlmTrait + Send + Sync>,
    pub tts: Arc<dyn TtsTrait + Send + Sync>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let llm = Arc::new(OpenAiLlm::new(
            config.llm.api_key.clone(),
            config.llm.model.clone(),
            config.llm.base_url.clone(),
        ));
        let tts = Arc::new(ElevenLabsTts::new(
            config.tts.api_key.clone(),
            config.tts.voice_id.clone(),
            config.tts.base_url.clone(),
        ));

        Self {
            config: Arc::new(config),
            llm,
            tts,
        }
    }

    /// Build state around pre-constructed clients. Tests use this to swap in
    /// doubles for the upstream services.
    pub fn with_services(
        config: ServerConfig,
        llm: Arc<dyn LlmTrait + Send + Sync>,
        tts: Arc<dyn TtsTrait + Send + Sync>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            llm,
            tts,
        }
    }
}
