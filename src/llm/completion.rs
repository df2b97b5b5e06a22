use log::info;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use serde_json::Value;

use super::CompletionError;
use crate::models::chat::{ ChatTurn, Role };

/// Production endpoint of the Yandex Foundation Models completion API.
pub const COMPLETION_URL: &str =
    "https://llm.api.cloud.yandex.net/foundationModels/v1/completion";

#[derive(Debug, Clone)]
pub struct CompletionConfig {
    pub api_key: String,
    pub folder_id: String,
    /// Model segment of the modelUri, e.g. "yandexgpt/latest".
    pub model: String,
    pub endpoint: String,
}

/// Client for a single completion round trip. Stateless apart from the
/// shared connection pool; no retries.
pub struct CompletionClient {
    http: HttpClient,
    config: CompletionConfig,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub model_uri: String,
    pub completion_options: CompletionOptions,
    pub messages: Vec<WireMessage>,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CompletionOptions {
    pub stream: bool,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// The provider expects `text` where the client API says `content`.
#[derive(Serialize, Debug)]
pub struct WireMessage {
    pub role: Role,
    pub text: String,
}

#[derive(Deserialize, Debug, Default)]
struct CompletionEnvelope {
    #[serde(default)]
    result: CompletionResult,
}

#[derive(Deserialize, Debug, Default)]
struct CompletionResult {
    #[serde(default)]
    alternatives: Vec<CompletionAlternative>,
}

#[derive(Deserialize, Debug, Default)]
struct CompletionAlternative {
    #[serde(default)]
    message: AlternativeMessage,
}

#[derive(Deserialize, Debug, Default)]
struct AlternativeMessage {
    #[serde(default)]
    text: String,
}

impl CompletionClient {
    pub fn new(http: HttpClient, config: CompletionConfig) -> Self {
        Self { http, config }
    }

    pub fn model_uri(&self) -> String {
        format!("gpt://{}/{}", self.config.folder_id, self.config.model)
    }

    pub fn build_request(
        &self,
        turns: &[ChatTurn],
        temperature: f64,
        max_tokens: u32
    ) -> CompletionRequest {
        CompletionRequest {
            model_uri: self.model_uri(),
            completion_options: CompletionOptions {
                stream: false,
                temperature,
                max_tokens,
            },
            messages: turns
                .iter()
                .map(|turn| WireMessage {
                    role: turn.role,
                    text: turn.content.clone(),
                })
                .collect(),
        }
    }

    /// Perform the outbound call. Returns the raw provider payload so the
    /// relay can hand it back to the client untouched.
    pub async fn complete(&self, request: &CompletionRequest) -> Result<Value, CompletionError> {
        let resp = self.http
            .post(&self.config.endpoint)
            .header("Authorization", format!("Api-Key {}", self.config.api_key))
            .header("x-folder-id", &self.config.folder_id)
            .json(request)
            .send().await?;

        let status = resp.status();
        info!("[LLM Response] status: {}", status);

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CompletionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(resp.json::<Value>().await?)
    }
}

/// Text of the first alternative's message, or "" when the payload carries
/// no alternatives.
pub fn reply_text(raw: &Value) -> String {
    let envelope: CompletionEnvelope = serde_json::from_value(raw.clone()).unwrap_or_default();
    envelope.result.alternatives
        .into_iter()
        .next()
        .map(|alternative| alternative.message.text)
        .unwrap_or_default()
}
