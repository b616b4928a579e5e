use anyhow::Context;
use tokio::net::TcpListener;

use rag_gateway::config::Settings;
use rag_gateway::server::router::router;
use rag_gateway::state::AppState;
use rag_gateway::{logging, startup};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    logging::init(&settings.log_dir);

    let state = AppState::initialize(settings);
    startup::run_startup_checks(&state).await;

    let bind_addr = format!("0.0.0.0:{}", state.settings.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {bind_addr}"))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let app = router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
