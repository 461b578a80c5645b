use std::sync::Arc;

use crate::embedding::Embedder;
use crate::index::VectorIndex;

/// A cached ad accepted for reuse.
#[derive(Debug, Clone)]
pub struct CachedAd {
    pub product: String,
    pub text: String,
    pub score: f32,
}

/// Reuse decision over the ads collection.
///
/// Lookup is best-effort: an embedding or store failure is a miss, never an
/// error. The validity check is a case-insensitive substring match of the
/// product name in the candidate's text; it can false-accept an unrelated
/// ad that mentions the product and false-reject a good paraphrasing ad.
/// Kept deliberately cheap.
pub struct AdCache {
    embedder: Arc<Embedder>,
    ads: Arc<dyn VectorIndex>,
}

impl AdCache {
    pub fn new(embedder: Arc<Embedder>, ads: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, ads }
    }

    pub async fn lookup(&self, product: &str) -> Option<CachedAd> {
        let vector = match self.embedder.embed(product).await {
            Ok(vector) => vector,
            Err(err) => {
                tracing::debug!(error = %err, "cache lookup skipped, no embedding");
                return None;
            }
        };

        let matches = match self.ads.query(&vector, 1).await {
            Ok(matches) => matches,
            Err(err) => {
                tracing::warn!(error = %err, "ads collection unreachable, treating as miss");
                return None;
            }
        };

        let candidate = matches.into_iter().next()?;
        let text = candidate.metadata.get("ad_text")?.as_str()?.to_string();

        // Nearest-neighbor can surface a semantically close but
        // wrong-product ad; require the product name to appear.
        if !text.to_lowercase().contains(&product.to_lowercase()) {
            tracing::info!(
                product,
                candidate = %candidate.id,
                "nearest cached ad does not mention the product, regenerating"
            );
            return None;
        }

        Some(CachedAd {
            product: product.to_string(),
            text,
            score: candidate.score,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use serde_json::json;

    use crate::core::config::EmbeddingConfig;
    use crate::core::errors::PipelineError;
    use crate::embedding::EmbeddingBackend;
    use crate::index::memory::MemoryIndex;
    use crate::index::VectorRecord;

    struct StubBackend;

    #[async_trait]
    impl EmbeddingBackend for StubBackend {
        fn name(&self) -> &str {
            "stub"
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, PipelineError> {
            Ok(vec![1.0, 0.0])
        }
    }

    fn test_embedder() -> Arc<Embedder> {
        let config = EmbeddingConfig {
            dimension: 2,
            ..EmbeddingConfig::default()
        };
        Arc::new(Embedder::new(config, None, Arc::new(StubBackend)))
    }

    async fn ads_with(product: &str, ad_text: &str) -> Arc<MemoryIndex> {
        let ads = Arc::new(MemoryIndex::new());
        ads.upsert(VectorRecord {
            id: product.to_string(),
            values: vec![1.0, 0.0],
            metadata: json!({ "product": product, "ad_text": ad_text }),
        })
        .await
        .unwrap();
        ads
    }

    #[tokio::test]
    async fn accepts_ad_mentioning_the_product() {
        let ads = ads_with("Gadget Pro", "Buy GADGET PRO today, reviewers love it.").await;
        let cache = AdCache::new(test_embedder(), ads);

        let hit = cache.lookup("Gadget Pro").await.unwrap();
        assert!(hit.text.to_lowercase().contains("gadget pro"));
    }

    #[tokio::test]
    async fn rejects_nearest_ad_for_a_different_product() {
        // High similarity but the text never names the queried product.
        let ads = ads_with("Gadget Pro", "Buy Gadget Pro today.").await;
        let cache = AdCache::new(test_embedder(), ads);

        assert!(cache.lookup("Widget Max").await.is_none());
    }

    #[tokio::test]
    async fn empty_collection_is_a_miss() {
        let cache = AdCache::new(test_embedder(), Arc::new(MemoryIndex::new()));
        assert!(cache.lookup("Gadget Pro").await.is_none());
    }
}
