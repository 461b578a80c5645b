use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use crate::core::errors::PipelineError;
use super::{ScoredMatch, VectorIndex, VectorRecord};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for one Pinecone-style serverless index.
///
/// Every call is a live round trip; there is no client-side cache.
pub struct RemoteIndex {
    client: Client,
    api_key: String,
    host: String,
}

impl RemoteIndex {
    pub fn new(api_key: String, host: String) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            host: host.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl VectorIndex for RemoteIndex {
    async fn upsert(&self, record: VectorRecord) -> Result<(), PipelineError> {
        let url = format!("{}/vectors/upsert", self.host);
        let body = json!({
            "vectors": [{
                "id": record.id,
                "values": record.values,
                "metadata": record.metadata,
            }]
        });

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(PipelineError::store)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(PipelineError::StoreUnavailable(format!(
                "upsert failed: HTTP {status}: {error_body}"
            )));
        }

        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredMatch>, PipelineError> {
        let url = format!("{}/query", self.host);
        let body = json!({
            "vector": vector,
            "topK": top_k,
            "includeMetadata": true,
        });

        let response = self
            .client
            .post(&url)
            .header("Api-Key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(PipelineError::store)?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(PipelineError::StoreUnavailable(format!(
                "query failed: HTTP {status}: {error_body}"
            )));
        }

        let payload: Value = response.json().await.map_err(PipelineError::store)?;
        let matches = payload
            .get("matches")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        let mut results = Vec::with_capacity(matches.len());
        for entry in matches {
            let id = entry
                .get("id")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            if id.is_empty() {
                continue;
            }
            let score = entry
                .get("score")
                .and_then(|v| v.as_f64())
                .unwrap_or_default() as f32;
            let metadata = entry.get("metadata").cloned().unwrap_or(Value::Null);

            results.push(ScoredMatch {
                id,
                score,
                metadata,
            });
        }

        Ok(results)
    }
}
