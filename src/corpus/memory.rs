//! In-process corpus backend for local development and tests

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::check_dimension;
use super::CorpusStore;
use crate::errors::Result;
use crate::models::CaseRecord;
use crate::models::CorpusFilter;
use crate::models::VectorMatch;

/// Cosine similarity between two equal-length vectors
///
/// Zero-norm vectors (the "no signal" embedding) score 0 against
/// everything.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Corpus store holding records in memory
///
/// Matches the Postgres backend's semantics (cosine scores, tag-overlap
/// filters, upsert by id) so the retrieval stack behaves identically over
/// either backend.
#[derive(Debug)]
pub struct MemoryCorpusStore {
    records: RwLock<BTreeMap<String, CaseRecord>>,
    dimension: usize,
}

impl MemoryCorpusStore {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self {
            records: RwLock::new(BTreeMap::new()),
            dimension,
        }
    }
}

#[async_trait]
impl CorpusStore for MemoryCorpusStore {
    async fn upsert(&self, records: &[CaseRecord]) -> Result<()> {
        for record in records {
            check_dimension(self.dimension, &record.embedding, &record.id)?;
        }

        let mut store = self.records.write().await;
        for record in records {
            store.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn vector_query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&CorpusFilter>,
    ) -> Result<Vec<VectorMatch>> {
        check_dimension(self.dimension, embedding, "query")?;
        if k == 0 {
            return Ok(Vec::new());
        }

        let store = self.records.read().await;
        let mut matches: Vec<VectorMatch> = store
            .values()
            .filter(|record| filter.map_or(true, |f| f.matches(record)))
            .map(|record| VectorMatch {
                id: record.id.clone(),
                score: cosine_similarity(embedding, &record.embedding),
                record: record.clone(),
            })
            .collect();

        // Score descending; id ascending keeps equal scores deterministic
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(k);

        Ok(matches)
    }

    async fn delete_all(&self) -> Result<()> {
        self.records.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.records.read().await.len() as u64)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
