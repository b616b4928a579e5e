//! Non-fatal boot checks: collection creation and model verification.

use crate::state::AppState;
use crate::vector::VectorStore;

pub async fn run_startup_checks(state: &AppState) {
    if let Err(err) = state.store.ensure_collection().await {
        tracing::warn!("could not ensure vector collection: {err}");
    }

    let model_id = state.completions.model_id().to_string();
    match state.completions.list_models().await {
        Ok(ids) if ids.iter().any(|id| id == &model_id) => {
            tracing::info!(model = %model_id, "completion endpoint serves the configured model");
        }
        Ok(ids) => {
            tracing::warn!(
                model = %model_id,
                available = ?ids,
                "configured model not served by the completion endpoint"
            );
        }
        Err(err) => {
            tracing::warn!("could not verify completion endpoint models: {err}");
        }
    }
}
