use crate::traits::{TtsError, TtsTrait};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::info;

// Fixed voice rendering parameters; the voice itself comes from config.
const STABILITY: f64 = 0.5;
const SIMILARITY_BOOST: f64 = 0.8;

pub struct ElevenLabsTts {
    api_key: String,
    client: Client,
    voice_id: String,
    base_url: String,
}

impl ElevenLabsTts {
    pub fn new(api_key: String, voice_id: String, base_url: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| "https://api.elevenlabs.io".to_string());
        let clean_base = base.trim_end_matches('/').to_string();

        Self {
            api_key,
            client: Client::new(),
            voice_id,
            base_url: clean_base,
        }
    }
}

#[async_trait]
impl TtsTrait for ElevenLabsTts {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, TtsError> {
        let url = format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id);

        let body = json!({
            "text": text,
            "voice_settings": {
                "stability": STABILITY,
                "similarity_boost": SIMILARITY_BOOST
            }
        });

        info!(
            "Generating ElevenLabs TTS for {} chars using voice '{}'",
            text.len(),
            self.voice_id
        );

        let resp = self
            .client
            .post(&url)
            .header("xi-api-key", &self.api_key)
            .json(&body)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TtsError::Timeout
                } else {
                    TtsError::Network(e.to_string())
                }
            })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(TtsError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let audio = resp
            .bytes()
            .await
            .map_err(|e| TtsError::Network(e.to_string()))?
            .to_vec();

        info!("Received {} bytes of MP3 audio from ElevenLabs", audio.len());
        Ok(audio)
    }
}
