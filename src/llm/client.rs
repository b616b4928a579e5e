use std::time::Duration;

use axum::http::StatusCode;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use super::types::ChatMessage;
use crate::errors::ApiError;

const MODELS_TIMEOUT: Duration = Duration::from_secs(15);

const TEMPERATURE: f64 = 0.2;
const MAX_TOKENS: u32 = 512;

#[derive(Deserialize)]
struct ModelsResponse {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

#[derive(Deserialize)]
struct ModelInfo {
    id: String,
}

/// Client for the OpenAI-chat-completions-shaped completion endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    base_url: String,
    api_key: String,
    model_id: String,
    client: Client,
}

impl CompletionClient {
    pub fn new(base_url: &str, api_key: &str, model_id: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model_id: model_id.to_string(),
            client: Client::new(),
        }
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// One chat completion. The upstream JSON body is returned untouched on
    /// success; a non-success response becomes `CompletionFailed` carrying
    /// the upstream status and body.
    ///
    /// Deliberately no timeout: generation may be slow.
    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<Value, ApiError> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = completion_body(&self.model_id, &messages);

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| ApiError::Upstream(format!("completion endpoint unreachable: {err}")))?;

        let status = res.status();
        if !status.is_success() {
            let detail = res.text().await.unwrap_or_default();
            return Err(ApiError::CompletionFailed {
                status: StatusCode::from_u16(status.as_u16())
                    .unwrap_or(StatusCode::BAD_GATEWAY),
                detail,
            });
        }

        res.json::<Value>().await.map_err(ApiError::upstream)
    }

    /// Ids of the models the endpoint currently serves.
    pub async fn list_models(&self) -> Result<Vec<String>, ApiError> {
        let url = format!("{}/v1/models", self.base_url);
        let res = self
            .client
            .get(&url)
            .timeout(MODELS_TIMEOUT)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !res.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "model listing returned {}",
                res.status()
            )));
        }

        let response: ModelsResponse = res.json().await.map_err(ApiError::upstream)?;
        Ok(response.data.into_iter().map(|m| m.id).collect())
    }
}

fn completion_body(model_id: &str, messages: &[ChatMessage]) -> Value {
    json!({
        "model": model_id,
        "messages": messages,
        "temperature": TEMPERATURE,
        "max_tokens": MAX_TOKENS,
    })
}
