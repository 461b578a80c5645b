use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::PipelineError;
use super::EmbeddingBackend;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Gemini `embedContent` client.
///
/// The service is asked for the configured output width so remote and
/// local vectors stay comparable in a shared collection.
pub struct GeminiEmbedding {
    client: Client,
    api_key: String,
    model: String,
    dimension: usize,
    base_url: String,
}

impl GeminiEmbedding {
    pub fn new(api_key: String, model: String, dimension: usize) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            model,
            dimension,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    #[allow(dead_code)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl EmbeddingBackend for GeminiEmbedding {
    fn name(&self) -> &str {
        "gemini-embed"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let url = format!(
            "{}/v1beta/models/{}:embedContent?key={}",
            self.base_url, self.model, self.api_key
        );

        let body = json!({
            "content": { "parts": [{ "text": text }] },
            "outputDimensionality": self.dimension,
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(PipelineError::transient)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_failure(status.as_u16(), &error_body));
        }

        let payload: Value = response.json().await.map_err(PipelineError::transient)?;
        let values = payload["embedding"]["values"]
            .as_array()
            .ok_or_else(|| {
                PipelineError::TransientRemote("response missing embedding values".to_string())
            })?;

        Ok(values
            .iter()
            .filter_map(|v| v.as_f64().map(|f| f as f32))
            .collect())
    }
}

/// Rate-limit/quota/auth responses must fall back immediately instead of
/// being retried.
fn classify_failure(status: u16, body: &str) -> PipelineError {
    let quota_body = body.contains("RESOURCE_EXHAUSTED") || body.contains("quota");
    if status == 429 || status == 403 || quota_body {
        PipelineError::QuotaExceeded(format!("HTTP {status}: {body}"))
    } else {
        PipelineError::TransientRemote(format!("HTTP {status}: {body}"))
    }
}
