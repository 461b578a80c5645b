//! Review ingestion: search hits are scraped and stored as documents.

use std::sync::Arc;

use serde_json::json;

use crate::embedding::Embedder;
use crate::index::{VectorIndex, VectorRecord};
use crate::scraper::Scraper;
use crate::search::SearchClient;

/// Outcome of one ingestion run.
#[derive(Debug, Default)]
pub struct IngestReport {
    pub urls_found: usize,
    pub documents_stored: usize,
    pub pages_skipped: usize,
}

pub struct DocumentIngestor {
    search: SearchClient,
    scraper: Scraper,
    embedder: Arc<Embedder>,
    documents: Arc<dyn VectorIndex>,
}

impl DocumentIngestor {
    pub fn new(
        search: SearchClient,
        scraper: Scraper,
        embedder: Arc<Embedder>,
        documents: Arc<dyn VectorIndex>,
    ) -> Self {
        Self {
            search,
            scraper,
            embedder,
            documents,
        }
    }

    /// Search for reviews of `product`, scrape each hit and store the
    /// non-empty pages. One bad page or store failure never aborts the
    /// batch; documents are keyed by URL so re-ingestion is idempotent.
    pub async fn ingest(&self, product: &str) -> IngestReport {
        let mut report = IngestReport::default();

        let results = self.search.search(&format!("{product} reviews")).await;
        report.urls_found = results.len();

        if results.is_empty() {
            tracing::warn!(product, "no search results to ingest");
            return report;
        }

        for result in &results {
            let content = self.scraper.scrape(&result.url).await;
            if content.is_empty() {
                tracing::info!(url = %result.url, "skipping page with no content");
                report.pages_skipped += 1;
                continue;
            }

            match self.store_document(product, &result.url, &content).await {
                Ok(()) => report.documents_stored += 1,
                Err(err) => {
                    tracing::warn!(url = %result.url, error = %err, "document not stored");
                    report.pages_skipped += 1;
                }
            }
        }

        tracing::info!(
            product,
            stored = report.documents_stored,
            skipped = report.pages_skipped,
            "ingestion finished"
        );
        report
    }

    async fn store_document(
        &self,
        product: &str,
        url: &str,
        content: &str,
    ) -> Result<(), crate::core::errors::PipelineError> {
        let vector = self.embedder.embed(content).await?;

        self.documents
            .upsert(VectorRecord {
                id: url.to_string(),
                values: vector,
                metadata: json!({
                    "url": url,
                    "product": product,
                    "content": content,
                    "ingested_at": chrono::Utc::now().to_rfc3339(),
                }),
            })
            .await
    }
}
