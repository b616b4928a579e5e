use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::errors::ApiError;
use crate::extract::extract_text;
use crate::rag::{chunk_text, Chunk};
use crate::state::AppState;
use crate::vector::{Point, VectorStore};

/// `POST /upload`: multipart file upload. The file is decoded (PDF or
/// UTF-8 text), chunked, embedded and upserted.
pub async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<Value>, ApiError> {
    let mut filename = String::new();
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        if field.name() == Some("file") {
            filename = field.file_name().unwrap_or("upload").to_string();
            data = Some(field.bytes().await.map_err(|err| {
                ApiError::BadRequest(format!("could not read uploaded file: {err}"))
            })?);
        }
    }

    let data = data.ok_or_else(|| ApiError::BadRequest("missing `file` field".to_string()))?;
    let text = extract_text(&filename, &data)?;

    let chunks = chunk_text(
        &text,
        &filename,
        state.settings.chunk_size,
        state.settings.chunk_overlap,
    );
    if chunks.is_empty() {
        return Err(ApiError::BadRequest(
            "no text chunks produced from upload".to_string(),
        ));
    }

    let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
    let vectors = state.embedder.embed(&texts).await?;
    let points = chunk_points(chunks, vectors);
    let written = state.store.upsert(points).await?;

    tracing::info!(file = %filename, chunks = written, "uploaded and indexed file");
    Ok(Json(json!({ "chunks": written })))
}

fn chunk_points(chunks: Vec<Chunk>, vectors: Vec<Vec<f32>>) -> Vec<Point> {
    chunks
        .into_iter()
        .zip(vectors)
        .map(|(chunk, vector)| Point {
            id: Value::String(Uuid::new_v4().to_string()),
            vector,
            payload: json!({
                "text": chunk.text,
                "source": chunk.source,
                "chunk_index": chunk.chunk_index,
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_points_tag_source_and_index() {
        let chunks = vec![
            Chunk {
                text: "one".to_string(),
                source: "a.txt".to_string(),
                chunk_index: 0,
            },
            Chunk {
                text: "two".to_string(),
                source: "a.txt".to_string(),
                chunk_index: 1,
            },
        ];
        let points = chunk_points(chunks, vec![vec![0.1], vec![0.2]]);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].payload["source"], "a.txt");
        assert_eq!(points[1].payload["chunk_index"], 1);
        assert!(Uuid::parse_str(points[0].id.as_str().unwrap()).is_ok());
    }
}
