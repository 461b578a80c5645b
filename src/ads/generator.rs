//! Ad generation orchestration.
//!
//! Per request: cache check, retrieval, prompt assembly, backend chain,
//! template fallback, persistence. The only state mutation is the final
//! ads-collection upsert; every remote failure before that degrades the
//! stage instead of failing the request.

use std::sync::Arc;

use serde_json::json;

use crate::core::errors::PipelineError;
use crate::embedding::Embedder;
use crate::index::{VectorIndex, VectorRecord};
use crate::llm::provider::TextGenerator;
use super::cache::AdCache;
use super::template;
use super::{AdProvenance, GeneratedAd};

/// Grounding block substituted when retrieval yields nothing.
pub const NO_REVIEWS_CONTEXT: &str =
    "No reviews available. Write a general, compelling ad for the product.";

pub struct AdGenerator {
    embedder: Arc<Embedder>,
    documents: Arc<dyn VectorIndex>,
    ads: Arc<dyn VectorIndex>,
    cache: AdCache,
    backends: Vec<Arc<dyn TextGenerator>>,
    top_k: usize,
}

impl AdGenerator {
    pub fn new(
        embedder: Arc<Embedder>,
        documents: Arc<dyn VectorIndex>,
        ads: Arc<dyn VectorIndex>,
        backends: Vec<Arc<dyn TextGenerator>>,
        top_k: usize,
    ) -> Self {
        let cache = AdCache::new(embedder.clone(), ads.clone());
        Self {
            embedder,
            documents,
            ads,
            cache,
            backends,
            top_k,
        }
    }

    /// Generate an ad for `product`.
    ///
    /// Total apart from an empty product name: every remote dependency can
    /// fail and the call still returns usable ad text, degrading through
    /// the backend chain down to the deterministic template.
    pub async fn generate(
        &self,
        product: &str,
        force_regenerate: bool,
    ) -> Result<GeneratedAd, PipelineError> {
        let product = product.trim();
        if product.is_empty() {
            return Err(PipelineError::InvalidInput(
                "product name must not be empty".to_string(),
            ));
        }

        if !force_regenerate {
            if let Some(cached) = self.cache.lookup(product).await {
                tracing::info!(product, score = cached.score, "reusing cached ad");
                return Ok(GeneratedAd {
                    product: product.to_string(),
                    text: cached.text,
                    provenance: AdProvenance::Cached,
                });
            }
        }

        let snippets = self.retrieve(product).await;
        let prompt = build_prompt(product, &snippets);

        let (text, provenance) = match self.run_backend_chain(&prompt).await {
            Ok((text, backend)) => (text, AdProvenance::Model(backend)),
            Err(err) => {
                tracing::warn!(
                    product,
                    error = %err,
                    "falling back to deterministic template"
                );
                (template::render(product, &snippets), AdProvenance::Template)
            }
        };

        if !text.to_lowercase().contains(&product.to_lowercase()) {
            tracing::warn!(product, "generated ad does not mention the product");
        }

        self.persist(product, &text).await;

        Ok(GeneratedAd {
            product: product.to_string(),
            text,
            provenance,
        })
    }

    /// Top-k review snippets for the product, normalized to plain strings.
    /// Failures degrade to an empty set; the generic prompt covers that.
    async fn retrieve(&self, product: &str) -> Vec<String> {
        let vector = match self.embedder.embed(product).await {
            Ok(vector) => vector,
            Err(err) => {
                tracing::warn!(error = %err, "no query embedding, generating without context");
                return Vec::new();
            }
        };

        let matches = match self.documents.query(&vector, self.top_k).await {
            Ok(matches) => matches,
            Err(err) => {
                tracing::warn!(error = %err, "document retrieval failed, continuing without context");
                return Vec::new();
            }
        };

        matches
            .into_iter()
            .filter_map(|hit| {
                hit.metadata
                    .get("content")
                    .and_then(|c| c.as_str())
                    .map(str::to_string)
            })
            .filter(|content| !content.is_empty())
            .collect()
    }

    /// Try backends in priority order; an error or empty completion
    /// advances the chain.
    async fn run_backend_chain(&self, prompt: &str) -> Result<(String, String), PipelineError> {
        for backend in &self.backends {
            match backend.generate(prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    tracing::info!(backend = backend.name(), "ad generated");
                    return Ok((text.trim().to_string(), backend.name().to_string()));
                }
                Ok(_) => {
                    tracing::warn!(backend = backend.name(), "backend returned empty text");
                }
                Err(err) => {
                    tracing::warn!(backend = backend.name(), error = %err, "backend failed");
                }
            }
        }

        Err(PipelineError::GenerationExhausted(format!(
            "{} backend(s) tried",
            self.backends.len()
        )))
    }

    /// Upsert the final ad into the ads collection. Failures are logged and
    /// swallowed; they do not change the returned text.
    async fn persist(&self, product: &str, text: &str) {
        let vector = match self.embedder.embed(text).await {
            Ok(vector) => vector,
            Err(err) => {
                tracing::warn!(product, error = %err, "ad embedding unavailable, result not cached");
                return;
            }
        };

        let record = VectorRecord {
            id: product.to_string(),
            values: vector,
            metadata: json!({ "product": product, "ad_text": text }),
        };

        if let Err(err) = self.ads.upsert(record).await {
            tracing::warn!(product, error = %err, "ad upsert failed, result not cached");
        }
    }
}

/// Grounded prompt: fixed instruction plus the snippets in
/// similarity-descending order.
pub fn build_prompt(product: &str, snippets: &[String]) -> String {
    let reviews_text = if snippets.is_empty() {
        NO_REVIEWS_CONTEXT.to_string()
    } else {
        snippets.join("\n")
    };

    format!(
        "You are an expert ad copywriter. Create a compelling advertisement \
         for the product: \"{product}\".\n\n\
         Base your ad on the following customer reviews and insights:\n\
         {reviews_text}\n\n\
         Make sure the ad has appropriate trust signals, urgency and a clear \
         call to action."
    )
}
