use std::sync::Arc;

use crate::ads::generator::AdGenerator;
use crate::core::config::{AppConfig, IndexConfig};
use crate::embedding::local::LocalEmbedder;
use crate::embedding::remote::GeminiEmbedding;
use crate::embedding::{Embedder, EmbeddingBackend};
use crate::index::memory::MemoryIndex;
use crate::index::remote::RemoteIndex;
use crate::index::VectorIndex;
use crate::ingest::DocumentIngestor;
use crate::llm::gemini::GeminiGenerator;
use crate::llm::provider::TextGenerator;
use crate::scraper::Scraper;
use crate::search::SearchClient;

/// Fully wired pipeline. Construction is infallible: missing credentials
/// select the degraded tier (local embedding, in-memory index, template
/// generation) instead of refusing to start.
pub struct AppState {
    pub config: AppConfig,
    pub ingestor: DocumentIngestor,
    pub generator: AdGenerator,
}

impl AppState {
    pub fn initialize(config: AppConfig) -> Arc<Self> {
        let remote_embedding: Option<Arc<dyn EmbeddingBackend>> =
            config.embedding.api_key.clone().map(|key| {
                Arc::new(GeminiEmbedding::new(
                    key,
                    config.embedding.model.clone(),
                    config.embedding.dimension,
                )) as Arc<dyn EmbeddingBackend>
            });
        if remote_embedding.is_none() {
            tracing::info!("no embedding credential, local model only");
        }

        let embedder = Arc::new(Embedder::new(
            config.embedding.clone(),
            remote_embedding,
            Arc::new(LocalEmbedder::new()),
        ));

        let documents = build_index(&config.index, config.index.docs_host.as_deref(), "documents");
        let ads = build_index(&config.index, config.index.ads_host.as_deref(), "ads");

        let backends: Vec<Arc<dyn TextGenerator>> = match &config.generation.api_key {
            Some(key) => config
                .generation
                .models
                .iter()
                .map(|model| {
                    Arc::new(GeminiGenerator::new(key.clone(), model.clone()))
                        as Arc<dyn TextGenerator>
                })
                .collect(),
            None => {
                tracing::warn!("no generation credential, template fallback only");
                Vec::new()
            }
        };

        let generator = AdGenerator::new(
            embedder.clone(),
            documents.clone(),
            ads,
            backends,
            config.generation.top_k,
        );
        let ingestor = DocumentIngestor::new(
            SearchClient::new(config.search.clone()),
            Scraper::new(),
            embedder,
            documents,
        );

        Arc::new(AppState {
            config,
            ingestor,
            generator,
        })
    }
}

fn build_index(
    config: &IndexConfig,
    host: Option<&str>,
    collection: &str,
) -> Arc<dyn VectorIndex> {
    match (host, &config.api_key) {
        (Some(host), Some(key)) => Arc::new(RemoteIndex::new(key.clone(), host.to_string())),
        _ => {
            tracing::warn!(
                collection,
                "no remote index configured, using in-memory index"
            );
            Arc::new(MemoryIndex::new())
        }
    }
}
