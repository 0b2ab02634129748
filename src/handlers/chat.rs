use axum::{extract::State, response::Json};
use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::state::AppState;
use crate::traits::TtsError;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

/// Body of a `/chat` response. Both variants go out with status 200; callers
/// tell them apart by which fields are present.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ChatOutcome {
    Success { reply: String, audio: String },
    Failure { error: String },
}

/// Faults that abort the pipeline. Display text is what the caller sees in
/// the `error` field.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Llm(anyhow::Error),
    #[error("ElevenLabs TTS failed: {0}")]
    Tts(#[from] TtsError),
}

pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatOutcome> {
    match run_pipeline(&state, &req.message).await {
        Ok(outcome) => Json(outcome),
        Err(e) => {
            error!("Chat pipeline failed: {}", e);
            Json(ChatOutcome::Failure {
                error: e.to_string(),
            })
        }
    }
}

/// LLM then TTS, strictly in that order. A fault at either step aborts the
/// whole request; a generated reply is discarded if synthesis fails.
async fn run_pipeline(state: &AppState, message: &str) -> Result<ChatOutcome, ChatError> {
    let reply = state.llm.chat(message).await.map_err(ChatError::Llm)?;
    info!("LLM reply: {} chars", reply.len());

    let audio = state.tts.synthesize(&reply).await?;
    info!("Synthesized {} bytes of audio", audio.len());

    Ok(ChatOutcome::Success {
        audio: general_purpose::STANDARD.encode(&audio),
        reply,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LlmSettings, ServerConfig, ServerSettings, TtsSettings};
    use crate::traits::{LlmTrait, TtsTrait};
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        routing::post,
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tower::util::ServiceExt;

    struct StubLlm {
        reply: Result<String, String>,
        seen: Mutex<Vec<String>>,
    }

    impl StubLlm {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing(fault: &str) -> Self {
            Self {
                reply: Err(fault.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LlmTrait for StubLlm {
        async fn chat(&self, text: &str) -> anyhow::Result<String> {
            self.seen.lock().unwrap().push(text.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(fault) => Err(anyhow::anyhow!("{}", fault)),
            }
        }
    }

    struct StubTts {
        result: Result<Vec<u8>, (u16, String)>,
        calls: AtomicUsize,
    }

    impl StubTts {
        fn returning(audio: &[u8]) -> Self {
            Self {
                result: Ok(audio.to_vec()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(status: u16, body: &str) -> Self {
            Self {
                result: Err((status, body.to_string())),
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TtsTrait for StubTts {
        async fn synthesize(&self, _text: &str) -> Result<Vec<u8>, TtsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(audio) => Ok(audio.clone()),
                Err((status, body)) => Err(TtsError::Service {
                    status: *status,
                    body: body.clone(),
                }),
            }
        }
    }

    fn test_config() -> ServerConfig {
        ServerConfig {
            server: ServerSettings::default(),
            llm: LlmSettings {
                api_key: "test".to_string(),
                model: "gpt-4o-mini".to_string(),
                base_url: None,
            },
            tts: TtsSettings {
                api_key: "test".to_string(),
                voice_id: "test-voice".to_string(),
                base_url: None,
            },
        }
    }

    fn test_app(llm: Arc<StubLlm>, tts: Arc<StubTts>) -> Router {
        let state = AppState::with_services(test_config(), llm, tts);
        Router::new()
            .route("/chat", post(handle_chat))
            .with_state(state)
    }

    async fn post_chat(app: Router, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn success_returns_reply_and_base64_audio() {
        let llm = Arc::new(StubLlm::replying("Hi there!"));
        let tts = Arc::new(StubTts::returning(&[0x01, 0x02]));
        let app = test_app(llm, tts.clone());

        let (status, body) = post_chat(app, r#"{"message": "Hello"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, serde_json::json!({ "reply": "Hi there!", "audio": "AQI=" }));
        assert_eq!(tts.call_count(), 1);
    }

    #[tokio::test]
    async fn tts_failure_embeds_status_and_body() {
        let llm = Arc::new(StubLlm::replying("Hi there!"));
        let tts = Arc::new(StubTts::failing(401, "unauthorized"));
        let app = test_app(llm, tts);

        let (status, body) = post_chat(app, r#"{"message": "Test"}"#).await;

        // Failures still ride on a 200, the body shape is the signal
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            serde_json::json!({ "error": "ElevenLabs TTS failed: 401 unauthorized" })
        );
    }

    #[tokio::test]
    async fn llm_fault_skips_synthesis() {
        let llm = Arc::new(StubLlm::failing("connection refused"));
        let tts = Arc::new(StubTts::returning(&[0x01]));
        let app = test_app(llm, tts.clone());

        let (status, body) = post_chat(app, r#"{"message": "Hello"}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error"], "connection refused");
        assert!(body.get("reply").is_none());
        assert!(body.get("audio").is_none());
        assert_eq!(tts.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_message_is_forwarded_unvalidated() {
        let llm = Arc::new(StubLlm::replying("Still here!"));
        let tts = Arc::new(StubTts::returning(&[0x01]));
        let app = test_app(llm.clone(), tts);

        let (status, body) = post_chat(app, r#"{"message": ""}"#).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["reply"], "Still here!");
        assert_eq!(*llm.seen.lock().unwrap(), vec!["".to_string()]);
    }
}
