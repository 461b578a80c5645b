//! Self-contained embedding fallback.
//!
//! Uses fastembed's BGESmallENV15 model (384 dimensions, ONNX runtime).
//! The model handle is constructed at most once per process and reused;
//! inference runs on the blocking pool behind a mutex.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};
use tokio::sync::OnceCell;

use crate::core::errors::PipelineError;
use super::EmbeddingBackend;

/// Native output width of BGESmallENV15.
pub const LOCAL_DIMENSION: usize = 384;

pub struct LocalEmbedder {
    model: OnceCell<Arc<Mutex<TextEmbedding>>>,
}

impl LocalEmbedder {
    pub fn new() -> Self {
        Self {
            model: OnceCell::new(),
        }
    }

    async fn model(&self) -> Result<Arc<Mutex<TextEmbedding>>, PipelineError> {
        let model = self
            .model
            .get_or_try_init(|| async {
                tokio::task::spawn_blocking(|| {
                    TextEmbedding::try_new(
                        InitOptions::new(EmbeddingModel::BGESmallENV15)
                            .with_show_download_progress(false),
                    )
                    .map(|m| Arc::new(Mutex::new(m)))
                    .map_err(|e| {
                        PipelineError::EmbeddingUnavailable(format!(
                            "local model init failed: {e}"
                        ))
                    })
                })
                .await
                .map_err(|e| PipelineError::EmbeddingUnavailable(e.to_string()))?
            })
            .await?;

        Ok(model.clone())
    }
}

impl Default for LocalEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EmbeddingBackend for LocalEmbedder {
    fn name(&self) -> &str {
        "fastembed-bge-small"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, PipelineError> {
        let model = self.model().await?;
        let text = text.to_string();

        let mut batch = tokio::task::spawn_blocking(move || {
            let mut guard = model.lock().map_err(|_| {
                PipelineError::EmbeddingUnavailable("local model lock poisoned".to_string())
            })?;
            guard
                .embed(vec![text], None)
                .map_err(|e| PipelineError::EmbeddingUnavailable(e.to_string()))
        })
        .await
        .map_err(|e| PipelineError::EmbeddingUnavailable(e.to_string()))??;

        batch.pop().ok_or_else(|| {
            PipelineError::EmbeddingUnavailable("local model returned no vectors".to_string())
        })
    }
}
