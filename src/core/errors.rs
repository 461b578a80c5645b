use thiserror::Error;

/// Error taxonomy for the ad-generation pipeline.
///
/// Failures are absorbed at the stage boundary closest to their origin:
/// a retrieval failure degrades to "no context", a cache failure to a miss,
/// a persistence failure to "not cached". Only `InvalidInput` on the query
/// subject itself escapes `AdGenerator::generate`.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("transient remote failure: {0}")]
    TransientRemote(String),
    #[error("quota or auth rejection: {0}")]
    QuotaExceeded(String),
    #[error("vector store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("embedding width mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("embedding unavailable: {0}")]
    EmbeddingUnavailable(String),
    #[error("all generative backends failed: {0}")]
    GenerationExhausted(String),
}

impl PipelineError {
    pub fn transient<E: std::fmt::Display>(err: E) -> Self {
        PipelineError::TransientRemote(err.to_string())
    }

    pub fn store<E: std::fmt::Display>(err: E) -> Self {
        PipelineError::StoreUnavailable(err.to_string())
    }

    /// Quota/auth rejections must not burn the retry budget.
    pub fn is_quota(&self) -> bool {
        matches!(self, PipelineError::QuotaExceeded(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_classification() {
        assert!(PipelineError::QuotaExceeded("429".into()).is_quota());
        assert!(!PipelineError::TransientRemote("timeout".into()).is_quota());
    }
}
