//! HTTP client for the embedding microservice.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

const EMBED_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    inputs: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

/// Vectorizes text. The gateway talks to the embedding microservice through
/// this seam; tests substitute a stub.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError>;
}

/// Client for the embedding microservice's `POST /embed` endpoint.
///
/// Failures propagate; embedding errors are never degraded.
#[derive(Clone)]
pub struct EmbedClient {
    base_url: String,
    client: Client,
}

impl EmbedClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for EmbedClient {
    async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, ApiError> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/embed", self.base_url);
        let res = self
            .client
            .post(&url)
            .timeout(EMBED_TIMEOUT)
            .json(&EmbedRequest { inputs })
            .send()
            .await
            .map_err(|err| ApiError::Upstream(format!("embedding service unreachable: {err}")))?;

        if !res.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "embedding service returned {}",
                res.status()
            )));
        }

        let payload: EmbedResponse = res.json().await.map_err(ApiError::upstream)?;
        Ok(payload.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_inputs_short_circuit() {
        // No server is listening here; an empty batch must not hit the wire.
        let client = EmbedClient::new("http://127.0.0.1:1");
        let vectors = client.embed(&[]).await.unwrap();
        assert!(vectors.is_empty());
    }

    #[tokio::test]
    #[ignore]
    async fn live_embed_roundtrip() {
        let client = EmbedClient::new("http://localhost:8080");
        let vectors = client
            .embed(&["hello world".to_string()])
            .await
            .expect("embedding service reachable");
        assert_eq!(vectors.len(), 1);
        assert!(!vectors[0].is_empty());
    }
}
