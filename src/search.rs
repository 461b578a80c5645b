use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::core::config::SearchConfig;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

/// Google Custom Search wrapper.
///
/// Returns an empty list on missing credentials or any transport/HTTP/parse
/// failure; search problems never abort the pipeline.
pub struct SearchClient {
    client: Client,
    config: SearchConfig,
}

impl SearchClient {
    pub fn new(config: SearchConfig) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self { client, config }
    }

    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        let (api_key, engine_id) = match (&self.config.api_key, &self.config.engine_id) {
            (Some(key), Some(id)) => (key, id),
            _ => {
                tracing::warn!("search credentials not configured, returning no results");
                return Vec::new();
            }
        };

        match self.google_search(query, api_key, engine_id).await {
            Ok(results) => results,
            Err(err) => {
                tracing::warn!(query, error = %err, "web search failed");
                Vec::new()
            }
        }
    }

    async fn google_search(
        &self,
        query: &str,
        api_key: &str,
        engine_id: &str,
    ) -> Result<Vec<SearchResult>, reqwest::Error> {
        let url = format!(
            "https://customsearch.googleapis.com/customsearch/v1?key={}&cx={}&num={}&q={}",
            api_key,
            engine_id,
            self.config.num_results,
            urlencoding::encode(query)
        );

        let response = self.client.get(url).send().await?;
        let payload: Value = response.error_for_status()?.json().await?;

        let items = payload
            .get("items")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut results = Vec::new();
        for item in items {
            let title = item
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let url = item
                .get("link")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            let snippet = item
                .get("snippet")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            if !url.is_empty() {
                results.push(SearchResult {
                    title,
                    url,
                    snippet,
                });
            }
        }

        Ok(results)
    }
}
