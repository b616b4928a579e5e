//! Best-effort web search.
//!
//! Provider errors never surface to callers: any failure degrades to an
//! empty result list and is only logged.

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::errors::ApiError;

const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub url: String,
}

#[derive(Clone)]
pub struct WebSearchClient {
    client: Client,
}

impl WebSearchClient {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Run a text search and return at most `count` hits. Best-effort: a
    /// provider or transport failure yields an empty list.
    pub async fn search(&self, query: &str, count: usize) -> Vec<SearchHit> {
        match self.duckduckgo(query).await {
            Ok(mut hits) => {
                hits.truncate(count);
                hits
            }
            Err(err) => {
                tracing::warn!("web search failed: {err}");
                Vec::new()
            }
        }
    }

    async fn duckduckgo(&self, query: &str) -> Result<Vec<SearchHit>, ApiError> {
        let url = format!(
            "https://api.duckduckgo.com/?q={}&format=json&no_redirect=1&no_html=1",
            urlencoding::encode(query)
        );

        let response = self
            .client
            .get(url)
            .timeout(SEARCH_TIMEOUT)
            .send()
            .await
            .map_err(ApiError::upstream)?;

        if !response.status().is_success() {
            return Err(ApiError::Upstream(format!(
                "search provider returned {}",
                response.status()
            )));
        }

        let payload: Value = response.json().await.map_err(ApiError::upstream)?;
        Ok(parse_results(&payload))
    }
}

impl Default for WebSearchClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_results(payload: &Value) -> Vec<SearchHit> {
    let mut results = Vec::new();

    if let Some(abstract_text) = payload.get("AbstractText").and_then(|v| v.as_str()) {
        if let Some(url) = payload.get("AbstractURL").and_then(|v| v.as_str()) {
            if !abstract_text.is_empty() && !url.is_empty() {
                results.push(SearchHit {
                    title: abstract_text
                        .split(" - ")
                        .next()
                        .unwrap_or(abstract_text)
                        .to_string(),
                    snippet: abstract_text.to_string(),
                    url: url.to_string(),
                });
            }
        }
    }

    if let Some(items) = payload.get("Results").and_then(|v| v.as_array()) {
        extract_topics(items, &mut results);
    }
    if let Some(items) = payload.get("RelatedTopics").and_then(|v| v.as_array()) {
        extract_topics(items, &mut results);
    }

    results
}

fn extract_topics(items: &[Value], results: &mut Vec<SearchHit>) {
    for item in items {
        if let Some(topics) = item.get("Topics").and_then(|v| v.as_array()) {
            extract_topics(topics, results);
            continue;
        }
        let text = item.get("Text").and_then(|v| v.as_str()).unwrap_or("");
        let url = item.get("FirstURL").and_then(|v| v.as_str()).unwrap_or("");
        if text.is_empty() || url.is_empty() {
            continue;
        }
        results.push(SearchHit {
            title: text.split(" - ").next().unwrap_or(text).to_string(),
            snippet: text.to_string(),
            url: url.to_string(),
        });
    }
}
