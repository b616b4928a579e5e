//! Process-wide settings, read once from the environment at startup.
//!
//! Every downstream endpoint the gateway talks to (completion endpoint,
//! embedding service, vector store, web search) is resolved here; nothing is
//! reconfigurable at runtime.

use std::env;
use std::path::PathBuf;

/// Default web-search result count bounds.
const WEB_RESULTS_MIN: usize = 1;
const WEB_RESULTS_MAX: usize = 8;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the OpenAI-chat-completions-shaped endpoint.
    pub completion_url: String,
    /// Base URL of the embedding microservice.
    pub embedder_url: String,
    /// Base URL of the vector store REST API.
    pub qdrant_url: String,
    /// Bearer key sent to the completion endpoint.
    pub api_key: String,
    /// Model id sent with every completion request.
    pub model_id: String,
    /// Vector collection name.
    pub collection: String,
    /// Vector dimension of the collection.
    pub embed_dim: usize,
    /// Default web-search result count, clamped into 1..=8.
    pub web_results: usize,
    /// Upload chunk window in characters.
    pub chunk_size: usize,
    /// Overlap between consecutive upload chunks, in characters.
    pub chunk_overlap: usize,
    pub port: u16,
    pub log_dir: PathBuf,
}

impl Settings {
    pub fn from_env() -> Self {
        let chunk_size = env_parse("CHUNK_SIZE", 1000).max(1);
        let mut chunk_overlap = env_parse("CHUNK_OVERLAP", 100);
        if chunk_overlap >= chunk_size {
            tracing::warn!(
                chunk_size,
                chunk_overlap,
                "CHUNK_OVERLAP must be smaller than CHUNK_SIZE; using chunk_size / 10"
            );
            chunk_overlap = chunk_size / 10;
        }

        Settings {
            completion_url: env_url("COMPLETION_URL", "http://localhost:8000"),
            embedder_url: env_url("EMBEDDER_URL", "http://localhost:8080"),
            qdrant_url: env_url("QDRANT_URL", "http://localhost:6333"),
            api_key: env_or("COMPLETION_API_KEY", "devkey123"),
            model_id: env_or("MODEL_ID", "astronomer/Llama-3-8B-Instruct-GPTQ-8-Bit"),
            collection: env_or("COLLECTION", "docs"),
            embed_dim: env_parse("EMBED_DIM", 384),
            web_results: clamp_web_results(env_parse("WEB_RESULTS", 4)),
            chunk_size,
            chunk_overlap,
            port: env_parse("PORT", 8090),
            log_dir: PathBuf::from(env_or("LOG_DIR", "logs")),
        }
    }
}

/// Clamp a requested web-search result count into the supported range.
pub fn clamp_web_results(count: usize) -> usize {
    count.clamp(WEB_RESULTS_MIN, WEB_RESULTS_MAX)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|val| !val.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_url(key: &str, default: &str) -> String {
    env_or(key, default).trim_end_matches('/').to_string()
}

fn env_parse<T: std::str::FromStr + Copy>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|val| val.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn web_results_clamped_into_range() {
        assert_eq!(clamp_web_results(0), 1);
        assert_eq!(clamp_web_results(4), 4);
        assert_eq!(clamp_web_results(100), 8);
    }

    #[test]
    fn defaults_are_usable() {
        let settings = Settings::from_env();
        assert!(!settings.completion_url.ends_with('/'));
        assert!(settings.chunk_overlap < settings.chunk_size);
        assert!((1..=8).contains(&settings.web_results));
    }
}
