//! Vector store abstraction.
//!
//! The store is a black box reached only through its REST API; this module
//! provides:
//! - `VectorStore` trait for the upsert/search seam used by the handlers
//! - `QdrantStore`, the HTTP implementation

mod qdrant;

pub use qdrant::QdrantStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ApiError;

/// A record to be written to the store: an embedding paired with the original
/// document fields. Immutable from the gateway's perspective once upserted.
#[derive(Debug, Clone, Serialize)]
pub struct Point {
    /// String or integer id; the store accepts both.
    pub id: Value,
    pub vector: Vec<f32>,
    pub payload: Value,
}

/// One similarity-search match with its payload.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredPoint {
    pub score: f32,
    #[serde(default)]
    pub payload: Value,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create the collection if it does not exist yet. Called once at
    /// startup; the store may come up later, so callers treat failure as a
    /// warning.
    async fn ensure_collection(&self) -> Result<(), ApiError>;

    /// Write points and wait for the store to acknowledge them. Returns the
    /// number written.
    async fn upsert(&self, points: Vec<Point>) -> Result<usize, ApiError>;

    /// Top-k nearest points by cosine distance, with payloads.
    async fn search(&self, vector: &[f32], limit: usize) -> Result<Vec<ScoredPoint>, ApiError>;
}
