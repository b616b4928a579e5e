use std::sync::Arc;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::trace::TraceLayer;

use super::model::SentenceEmbedder;
use crate::errors::ApiError;

#[derive(Debug, Deserialize)]
pub struct EmbedRequest {
    #[serde(default)]
    pub inputs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f32>>,
}

pub fn router(embedder: Arc<SentenceEmbedder>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/embed", post(embed))
        .with_state(embedder)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn embed(
    State(embedder): State<Arc<SentenceEmbedder>>,
    Json(req): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, ApiError> {
    if req.inputs.is_empty() {
        return Ok(Json(EmbedResponse {
            embeddings: Vec::new(),
        }));
    }

    let embeddings = embedder.embed(req.inputs).await?;
    Ok(Json(EmbedResponse { embeddings }))
}
