//! The embedding microservice.
//!
//! A separate binary that loads a sentence-embeddings model once and exposes
//! it as a single `POST /embed` endpoint, used by the gateway for both
//! ingestion and query-time vectorization.

mod model;
mod service;

pub use model::SentenceEmbedder;
pub use service::router;
