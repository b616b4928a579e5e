use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::config::Settings;
use crate::embedding::{EmbedClient, Embedder};
use crate::llm::CompletionClient;
use crate::search::WebSearchClient;
use crate::vector::{QdrantStore, VectorStore};

#[derive(Clone)]
pub struct AppState {
    pub settings: Settings,
    pub embedder: Arc<dyn Embedder>,
    pub store: Arc<dyn VectorStore>,
    pub completions: CompletionClient,
    pub web_search: WebSearchClient,
    #[allow(dead_code)]
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn initialize(settings: Settings) -> Arc<Self> {
        let embedder = Arc::new(EmbedClient::new(&settings.embedder_url));
        let store = Arc::new(QdrantStore::new(
            &settings.qdrant_url,
            &settings.collection,
            settings.embed_dim,
        ));
        let completions = CompletionClient::new(
            &settings.completion_url,
            &settings.api_key,
            &settings.model_id,
        );
        let web_search = WebSearchClient::new();
        let started_at = Utc::now();

        Arc::new(AppState {
            settings,
            embedder,
            store,
            completions,
            web_search,
            started_at,
        })
    }
}
