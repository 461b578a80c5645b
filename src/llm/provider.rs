use async_trait::async_trait;

use crate::core::errors::PipelineError;

/// A generative text backend.
///
/// Backends are tried in a configured priority order; an error or empty
/// completion advances the chain to the next backend.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend label for logs and provenance (e.g. "gemini-1.5-flash").
    fn name(&self) -> &str;

    /// Produce a completion for the prompt.
    async fn generate(&self, prompt: &str) -> Result<String, PipelineError>;
}
