//! End-to-end generation behavior against the in-memory index, with fault
//! injection at every remote seam.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use adforge::ads::generator::{AdGenerator, NO_REVIEWS_CONTEXT};
use adforge::ads::AdProvenance;
use adforge::core::config::EmbeddingConfig;
use adforge::core::errors::PipelineError;
use adforge::embedding::{Embedder, EmbeddingBackend};
use adforge::index::memory::MemoryIndex;
use adforge::index::{ScoredMatch, VectorIndex, VectorRecord};
use adforge::llm::provider::TextGenerator;

const DIM: usize = 4;

struct FixedEmbedding;

#[async_trait]
impl EmbeddingBackend for FixedEmbedding {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, PipelineError> {
        Ok(vec![1.0, 0.0, 0.0, 0.0])
    }
}

struct FailingEmbedding;

#[async_trait]
impl EmbeddingBackend for FailingEmbedding {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, PipelineError> {
        Err(PipelineError::TransientRemote("embedding down".to_string()))
    }
}

struct FailingIndex;

#[async_trait]
impl VectorIndex for FailingIndex {
    async fn upsert(&self, _record: VectorRecord) -> Result<(), PipelineError> {
        Err(PipelineError::StoreUnavailable("store down".to_string()))
    }

    async fn query(
        &self,
        _vector: &[f32],
        _top_k: usize,
    ) -> Result<Vec<ScoredMatch>, PipelineError> {
        Err(PipelineError::StoreUnavailable("store down".to_string()))
    }
}

struct FailingGenerator;

#[async_trait]
impl TextGenerator for FailingGenerator {
    fn name(&self) -> &str {
        "failing-model"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, PipelineError> {
        Err(PipelineError::TransientRemote("model down".to_string()))
    }
}

struct EmptyGenerator;

#[async_trait]
impl TextGenerator for EmptyGenerator {
    fn name(&self) -> &str {
        "empty-model"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, PipelineError> {
        Ok("   ".to_string())
    }
}

/// Returns a fixed completion and records every prompt it sees.
struct ScriptedGenerator {
    completion: String,
    calls: AtomicU32,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn new(completion: &str) -> Self {
        Self {
            completion: completion.to_string(),
            calls: AtomicU32::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.completion.clone())
    }
}

fn working_embedder() -> Arc<Embedder> {
    let config = EmbeddingConfig {
        dimension: DIM,
        max_retries: 2,
        ..EmbeddingConfig::default()
    };
    Arc::new(Embedder::new(config, None, Arc::new(FixedEmbedding)))
}

fn broken_embedder() -> Arc<Embedder> {
    let config = EmbeddingConfig {
        dimension: DIM,
        max_retries: 2,
        ..EmbeddingConfig::default()
    };
    Arc::new(Embedder::new(
        config,
        Some(Arc::new(FailingEmbedding)),
        Arc::new(FailingEmbedding),
    ))
}

/// Remote permanently down, local model healthy.
fn degraded_embedder() -> Arc<Embedder> {
    let config = EmbeddingConfig {
        dimension: DIM,
        max_retries: 2,
        ..EmbeddingConfig::default()
    };
    Arc::new(Embedder::new(
        config,
        Some(Arc::new(FailingEmbedding)),
        Arc::new(FixedEmbedding),
    ))
}

async fn seeded_documents() -> Arc<MemoryIndex> {
    let documents = Arc::new(MemoryIndex::new());
    for (url, content, values) in [
        ("https://reviews.example/battery", "Great battery", vec![1.0, 0.0, 0.0, 0.0]),
        ("https://reviews.example/camera", "Fast camera", vec![0.9, 0.1, 0.0, 0.0]),
    ] {
        documents
            .upsert(VectorRecord {
                id: url.to_string(),
                values,
                metadata: json!({ "url": url, "product": "Smartphone X", "content": content }),
            })
            .await
            .unwrap();
    }
    documents
}

#[tokio::test]
async fn empty_product_is_invalid_input() {
    let generator = AdGenerator::new(
        working_embedder(),
        Arc::new(MemoryIndex::new()),
        Arc::new(MemoryIndex::new()),
        vec![],
        5,
    );

    let err = generator.generate("   ", false).await.unwrap_err();
    assert!(matches!(err, PipelineError::InvalidInput(_)));
}

#[tokio::test(start_paused = true)]
async fn generate_is_total_when_every_remote_dependency_fails() {
    let generator = AdGenerator::new(
        broken_embedder(),
        Arc::new(FailingIndex),
        Arc::new(FailingIndex),
        vec![Arc::new(FailingGenerator)],
        5,
    );

    let ad = generator.generate("Smartphone X", false).await.unwrap();

    assert!(!ad.text.trim().is_empty());
    assert!(ad.text.contains("Smartphone X"));
    assert_eq!(ad.provenance, AdProvenance::Template);
}

#[tokio::test(start_paused = true)]
async fn full_degradation_uses_template_over_retrieved_snippets() {
    // Remote embedding and generative services permanently failing,
    // documents present: embedding degrades to the local model, the ad
    // comes from the local template built over the review snippets, and
    // the result is still written to the ads collection.
    let documents = seeded_documents().await;
    let ads = Arc::new(MemoryIndex::new());

    let generator = AdGenerator::new(
        degraded_embedder(),
        documents,
        ads.clone(),
        vec![Arc::new(FailingGenerator), Arc::new(EmptyGenerator)],
        5,
    );

    let ad = generator.generate("Smartphone X", false).await.unwrap();

    assert_eq!(ad.provenance, AdProvenance::Template);
    assert!(ad.text.contains("Smartphone X"));
    assert!(ad.text.contains("Great battery"));
    assert!(ad.text.contains("Fast camera"));

    let stored = ads.get("Smartphone X").await.expect("ad upsert recorded");
    assert_eq!(
        stored.metadata.get("ad_text").and_then(|v| v.as_str()),
        Some(ad.text.as_str())
    );
}

#[tokio::test]
async fn cache_hit_is_idempotent_and_skips_backends() {
    let backend = Arc::new(ScriptedGenerator::new(
        "Smartphone X: loved by thousands of reviewers. Order today.",
    ));
    let generator = AdGenerator::new(
        working_embedder(),
        seeded_documents().await,
        Arc::new(MemoryIndex::new()),
        vec![backend.clone()],
        5,
    );

    let first = generator.generate("Smartphone X", false).await.unwrap();
    let second = generator.generate("Smartphone X", false).await.unwrap();

    assert_eq!(first.provenance, AdProvenance::Model("scripted-model".to_string()));
    assert_eq!(second.provenance, AdProvenance::Cached);
    assert_eq!(first.text, second.text);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn force_regenerate_bypasses_a_valid_cache_entry() {
    let backend = Arc::new(ScriptedGenerator::new(
        "Smartphone X: the reviews speak for themselves. Buy now.",
    ));
    let generator = AdGenerator::new(
        working_embedder(),
        seeded_documents().await,
        Arc::new(MemoryIndex::new()),
        vec![backend.clone()],
        5,
    );

    generator.generate("Smartphone X", false).await.unwrap();
    let regenerated = generator.generate("Smartphone X", true).await.unwrap();

    assert_eq!(
        regenerated.provenance,
        AdProvenance::Model("scripted-model".to_string())
    );
    assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_retrieval_grounds_the_prompt_with_the_generic_instruction() {
    let backend = Arc::new(ScriptedGenerator::new("A general ad for Smartphone X."));
    let generator = AdGenerator::new(
        working_embedder(),
        Arc::new(MemoryIndex::new()),
        Arc::new(MemoryIndex::new()),
        vec![backend.clone()],
        5,
    );

    generator.generate("Smartphone X", false).await.unwrap();

    let prompts = backend.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(NO_REVIEWS_CONTEXT));
}

#[tokio::test]
async fn missing_product_mention_is_a_warning_not_a_rejection() {
    let backend = Arc::new(ScriptedGenerator::new(
        "An incredible device you will love. Order today.",
    ));
    let generator = AdGenerator::new(
        working_embedder(),
        seeded_documents().await,
        Arc::new(MemoryIndex::new()),
        vec![backend.clone()],
        5,
    );

    let ad = generator.generate("Smartphone X", false).await.unwrap();

    assert_eq!(ad.provenance, AdProvenance::Model("scripted-model".to_string()));
    assert!(!ad.text.contains("Smartphone X"));
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn empty_completion_advances_the_backend_chain() {
    let fallback = Arc::new(ScriptedGenerator::new(
        "Smartphone X, from the second backend.",
    ));
    let generator = AdGenerator::new(
        working_embedder(),
        seeded_documents().await,
        Arc::new(MemoryIndex::new()),
        vec![Arc::new(EmptyGenerator), fallback.clone()],
        5,
    );

    let ad = generator.generate("Smartphone X", false).await.unwrap();

    assert_eq!(ad.provenance, AdProvenance::Model("scripted-model".to_string()));
    assert_eq!(fallback.calls.load(Ordering::SeqCst), 1);
}
