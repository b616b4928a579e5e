use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{Point, ScoredPoint, VectorStore};
use crate::errors::ApiError;

const STORE_TIMEOUT: Duration = Duration::from_secs(30);

/// Vector store client speaking the Qdrant REST API over plain HTTP.
#[derive(Clone)]
pub struct QdrantStore {
    base_url: String,
    collection: String,
    dim: usize,
    client: Client,
}

impl QdrantStore {
    pub fn new(base_url: &str, collection: &str, dim: usize) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            collection: collection.to_string(),
            dim,
            client: Client::new(),
        }
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.base_url, self.collection)
    }
}

#[async_trait]
impl VectorStore for QdrantStore {
    async fn ensure_collection(&self) -> Result<(), ApiError> {
        let body = json!({ "vectors": { "size": self.dim, "distance": "Cosine" } });
        let res = self
            .client
            .put(self.collection_url())
            .timeout(STORE_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|err| ApiError::Upstream(format!("vector store unreachable: {err}")))?;

        // A non-success status usually means the collection already exists.
        if !res.status().is_success() {
            tracing::debug!(
                collection = %self.collection,
                status = %res.status(),
                "collection create returned non-success"
            );
        }
        Ok(())
    }

    async fn upsert(&self, points: Vec<Point>) -> Result<usize, ApiError> {
        let count = points.len();
        let url = format!("{}/points?wait=true", self.collection_url());
        let res = self
            .client
            .put(&url)
            .timeout(STORE_TIMEOUT)
            .json(&json!({ "points": points }))
            .send()
            .await
            .map_err(|err| ApiError::Upstream(format!("vector store unreachable: {err}")))?;

        if !res.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "vector store upsert returned {}",
                res.status()
            )));
        }
        Ok(count)
    }

    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, ApiError> {
        let url = format!("{}/points/search", self.collection_url());
        let body = json!({ "vector": vector, "limit": limit, "with_payload": true });
        let res = self
            .client
            .post(&url)
            .timeout(STORE_TIMEOUT)
            .json(&body)
            .send()
            .await
            .map_err(|err| ApiError::Upstream(format!("vector store unreachable: {err}")))?;

        if !res.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "vector store search returned {}",
                res.status()
            )));
        }

        let payload: Value = res.json().await.map_err(ApiError::upstream)?;
        parse_search_response(payload)
    }
}

fn parse_search_response(payload: Value) -> Result<Vec<ScoredPoint>, ApiError> {
    let rows = payload
        .get("result")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut hits = Vec::with_capacity(rows.len());
    for row in rows {
        match serde_json::from_value::<ScoredPoint>(row) {
            Ok(hit) => hits.push(hit),
            Err(err) => tracing::warn!("skipping malformed search hit: {err}"),
        }
    }
    Ok(hits)
}
