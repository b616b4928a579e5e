use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use rag_gateway::embedder::{router, SentenceEmbedder};
use rag_gateway::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let log_dir = PathBuf::from(env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
    logging::init(&log_dir);

    let embedder = Arc::new(SentenceEmbedder::spawn().context("Failed to load embeddings model")?);

    let port = env::var("EMBEDDER_PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(8080);
    let bind_addr = format!("0.0.0.0:{port}");

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;
    tracing::info!("Embedding service listening on {}", listener.local_addr()?);

    axum::serve(listener, router(embedder))
        .await
        .context("Server error")?;

    Ok(())
}
