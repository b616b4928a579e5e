use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::errors::ApiError;
use crate::state::AppState;
use crate::vector::{Point, VectorStore};

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    #[serde(default)]
    docs: Vec<Value>,
}

/// `POST /ingest`: embed raw documents and upsert them into the vector
/// store. Embedding or upsert failure fails the whole request.
pub async fn ingest(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<Value>, ApiError> {
    if req.docs.is_empty() {
        return Err(ApiError::BadRequest("`docs` must be a non-empty array".to_string()));
    }

    let texts = doc_texts(&req.docs)?;
    let vectors = state.embedder.embed(&texts).await?;
    let points = build_points(req.docs, vectors);
    let upserted = state.store.upsert(points).await?;

    tracing::info!(upserted, "ingested documents");
    Ok(Json(json!({ "upserted": upserted })))
}

fn doc_texts(docs: &[Value]) -> Result<Vec<String>, ApiError> {
    docs.iter()
        .map(|doc| {
            doc.get("text")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .ok_or_else(|| {
                    ApiError::BadRequest("every doc needs a string `text` field".to_string())
                })
        })
        .collect()
}

/// Pair each doc with its vector; the full doc object becomes the payload.
/// A missing id is replaced with a fresh UUID.
fn build_points(docs: Vec<Value>, vectors: Vec<Vec<f32>>) -> Vec<Point> {
    docs.into_iter()
        .zip(vectors)
        .map(|(doc, vector)| {
            let id = doc
                .get("id")
                .filter(|v| v.is_string() || v.is_number())
                .cloned()
                .unwrap_or_else(|| Value::String(Uuid::new_v4().to_string()));
            Point {
                id,
                vector,
                payload: doc,
            }
        })
        .collect()
}
