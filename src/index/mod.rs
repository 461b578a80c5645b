//! Typed wrapper around similarity-search storage.
//!
//! Two logical collections exist (documents and ads); each gets its own
//! index handle. The production backend is a remote serverless index, the
//! in-memory backend serves tests and credential-less dev runs.

pub mod memory;
pub mod remote;

use async_trait::async_trait;
use serde_json::Value;

use crate::core::errors::PipelineError;

/// One stored vector with its caller-owned metadata.
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: Value,
}

/// A query hit; `score` is similarity, higher is better.
#[derive(Debug, Clone)]
pub struct ScoredMatch {
    pub id: String,
    pub score: f32,
    pub metadata: Value,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert-or-replace keyed by `record.id`. No partial updates.
    async fn upsert(&self, record: VectorRecord) -> Result<(), PipelineError>;

    /// Nearest-neighbor search, ordered by decreasing similarity. Ties are
    /// broken arbitrarily by the backend.
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredMatch>, PipelineError>;
}
