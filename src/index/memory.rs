//! In-memory vector index.
//!
//! Brute-force cosine ranking over a hash map. Backs the test suite and
//! credential-less dev runs; nothing survives the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::errors::PipelineError;
use super::{ScoredMatch, VectorIndex, VectorRecord};

#[derive(Default)]
pub struct MemoryIndex {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn get(&self, id: &str) -> Option<VectorRecord> {
        self.records.read().await.get(id).cloned()
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn upsert(&self, record: VectorRecord) -> Result<(), PipelineError> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record);
        Ok(())
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<ScoredMatch>, PipelineError> {
        let records = self.records.read().await;

        let mut scored: Vec<ScoredMatch> = records
            .values()
            .map(|record| ScoredMatch {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.values),
                metadata: record.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;

    if denom <= f32::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(id: &str, values: Vec<f32>) -> VectorRecord {
        VectorRecord {
            id: id.to_string(),
            values,
            metadata: json!({ "id": id }),
        }
    }

    #[tokio::test]
    async fn upsert_and_query() {
        let index = MemoryIndex::new();
        index.upsert(record("a", vec![1.0, 0.0])).await.unwrap();

        let results = index.query(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "a");
        assert!(results[0].score > 0.99);
    }

    #[tokio::test]
    async fn upsert_replaces_by_id() {
        let index = MemoryIndex::new();
        index.upsert(record("a", vec![1.0, 0.0])).await.unwrap();
        index.upsert(record("a", vec![0.0, 1.0])).await.unwrap();

        assert_eq!(index.len().await, 1);
        let stored = index.get("a").await.unwrap();
        assert_eq!(stored.values, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn query_ranks_by_descending_similarity() {
        let index = MemoryIndex::new();
        index.upsert(record("near", vec![0.9, 0.1])).await.unwrap();
        index.upsert(record("far", vec![0.1, 0.9])).await.unwrap();
        index
            .upsert(record("exact", vec![1.0, 0.0]))
            .await
            .unwrap();

        let results = index.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "exact");
        assert_eq!(results[1].id, "near");
    }
}
