//! Text embedding with fault-tolerant fallback.
//!
//! The remote service is the primary path; transient failures are retried
//! with exponential backoff, quota/auth rejections short-circuit straight
//! to the local ONNX model. Every returned vector is checked against the
//! configured width before it can reach a store.

pub mod local;
pub mod remote;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::core::config::EmbeddingConfig;
use crate::core::errors::PipelineError;

/// A backend able to turn preprocessed text into a vector.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError>;
}

/// Embedding orchestrator: preprocessing, remote retry loop, local fallback.
pub struct Embedder {
    remote: Option<Arc<dyn EmbeddingBackend>>,
    local: Arc<dyn EmbeddingBackend>,
    config: EmbeddingConfig,
}

impl Embedder {
    pub fn new(
        config: EmbeddingConfig,
        remote: Option<Arc<dyn EmbeddingBackend>>,
        local: Arc<dyn EmbeddingBackend>,
    ) -> Self {
        Self {
            remote,
            local,
            config,
        }
    }

    /// Embed `text` into a vector of the configured width.
    ///
    /// Empty or whitespace-only input is `InvalidInput`. A remote outage
    /// degrades to the local model; only both paths failing returns an
    /// error, which callers treat as "no embedding available".
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let text = preprocess(text, self.config.max_input_chars)?;

        if let Some(remote) = self.active_remote() {
            match self.embed_remote(remote.as_ref(), &text).await {
                Ok(vector) => return self.check_width(vector),
                Err(err) => {
                    tracing::warn!(
                        backend = remote.name(),
                        error = %err,
                        "remote embedding unavailable, falling back to local model"
                    );
                }
            }
        }

        let vector = self.local.embed(&text).await?;
        self.check_width(vector)
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    fn active_remote(&self) -> Option<&Arc<dyn EmbeddingBackend>> {
        if self.config.local_only {
            return None;
        }
        self.remote.as_ref()
    }

    /// Retry loop over the remote backend. Quota/auth rejections abort the
    /// loop immediately instead of burning the retry budget.
    async fn embed_remote(
        &self,
        remote: &dyn EmbeddingBackend,
        text: &str,
    ) -> Result<Vec<f32>, PipelineError> {
        let mut last_err = PipelineError::TransientRemote("no attempts made".to_string());

        for attempt in 0..self.config.max_retries {
            match remote.embed(text).await {
                Ok(vector) => return Ok(vector),
                Err(err) if err.is_quota() => {
                    tracing::warn!(error = %err, "quota signal from embedding service");
                    return Err(err);
                }
                Err(err) => {
                    let wait = backoff_delay(self.config.backoff_base, attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max = self.config.max_retries,
                        wait_secs = wait.as_secs(),
                        error = %err,
                        "embedding request failed"
                    );
                    last_err = err;
                    if attempt + 1 < self.config.max_retries {
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        Err(last_err)
    }

    fn check_width(&self, vector: Vec<f32>) -> Result<Vec<f32>, PipelineError> {
        if vector.len() != self.config.dimension {
            return Err(PipelineError::DimensionMismatch {
                expected: self.config.dimension,
                actual: vector.len(),
            });
        }
        Ok(vector)
    }
}

/// Collapse whitespace and bound the input length before vectorization.
pub fn preprocess(text: &str, max_chars: usize) -> Result<String, PipelineError> {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return Err(PipelineError::InvalidInput(
            "text must be a non-empty string".to_string(),
        ));
    }
    Ok(collapsed.chars().take(max_chars).collect())
}

/// Wait time before the next retry: `base^attempt` seconds.
pub fn backoff_delay(base_secs: u64, attempt: u32) -> Duration {
    Duration::from_secs(base_secs.saturating_pow(attempt))
}
