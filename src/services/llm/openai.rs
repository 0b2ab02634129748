use crate::services::llm::PERSONA_INSTRUCTION;
use crate::traits::LlmTrait;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::info;

pub struct OpenAiLlm {
    api_key: String,
    client: Client,
    model: String,
    base_url: String,
}

impl OpenAiLlm {
    pub fn new(api_key: String, model: String, base_url: Option<String>) -> Self {
        let base = base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        // Ensure base_url doesn't end with slash for cleaner appending
        let clean_base = base.trim_end_matches('/').to_string();

        Self {
            api_key,
            client: Client::new(),
            model,
            base_url: clean_base,
        }
    }
}

#[async_trait]
impl LlmTrait for OpenAiLlm {
    async fn chat(&self, text: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);

        // Stateless: the persona plus the caller's message is the whole
        // conversation, every time.
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": PERSONA_INSTRUCTION },
                { "role": "user", "content": text }
            ],
        });

        info!(
            "Sending request to OpenAI model: {} at {}",
            self.model, self.base_url
        );

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
            .timeout(std::time::Duration::from_secs(30))
            .send()
            .await
            .context("Failed to send request to OpenAI")?;

        info!("OpenAI response status: {}", resp.status());

        if !resp.status().is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("OpenAI API error: {}", error_text));
        }

        let json: Value = resp
            .json()
            .await
            .context("Failed to parse OpenAI response")?;

        let reply = json["choices"][0]["message"]["content"]
            .as_str()
            .context("Invalid response shape from OpenAI (missing choices[0].message.content)")?
            .to_string();

        Ok(reply)
    }
}
