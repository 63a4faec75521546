//! Shared test doubles for the scenario tests

use std::sync::atomic::AtomicU32;
use std::sync::atomic::Ordering;

use async_trait::async_trait;

use crate::corpus::CorpusStore;
use crate::corpus::MemoryCorpusStore;
use crate::embeddings::Embedder;
use crate::errors::CounselRagError;
use crate::errors::Result;
use crate::models::CaseRecord;
use crate::models::CorpusFilter;
use crate::models::VectorMatch;

/// Deterministic embedder mapping text substrings to fixed vectors
///
/// The first assignment whose key occurs in the text wins; unmatched text
/// gets the default vector.
pub struct StaticEmbedder {
    dimension: usize,
    assignments: Vec<(String, Vec<f32>)>,
    default: Vec<f32>,
}

impl StaticEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            assignments: Vec::new(),
            default: vec![0.5; dimension],
        }
    }

    pub fn map(mut self, needle: &str, vector: Vec<f32>) -> Self {
        assert_eq!(vector.len(), self.dimension);
        self.assignments.push((needle.to_string(), vector));
        self
    }
}

#[async_trait]
impl Embedder for StaticEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        for (needle, vector) in &self.assignments {
            if text.contains(needle.as_str()) {
                return Ok(vector.clone());
            }
        }
        Ok(self.default.clone())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Store whose vector queries always fail (downed backend)
pub struct FailingStore {
    dimension: usize,
}

impl FailingStore {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl CorpusStore for FailingStore {
    async fn upsert(&self, _records: &[CaseRecord]) -> Result<()> {
        Err(CounselRagError::Http("store unreachable".to_string()))
    }

    async fn vector_query(
        &self,
        _embedding: &[f32],
        _k: usize,
        _filter: Option<&CorpusFilter>,
    ) -> Result<Vec<VectorMatch>> {
        Err(CounselRagError::Http("store unreachable".to_string()))
    }

    async fn delete_all(&self) -> Result<()> {
        Err(CounselRagError::Http("store unreachable".to_string()))
    }

    async fn count(&self) -> Result<u64> {
        Err(CounselRagError::Http("store unreachable".to_string()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Store that fails the first `failures` upserts, then delegates to memory
pub struct FlakyUpsertStore {
    inner: MemoryCorpusStore,
    remaining_failures: AtomicU32,
}

impl FlakyUpsertStore {
    pub fn new(dimension: usize, failures: u32) -> Self {
        Self {
            inner: MemoryCorpusStore::new(dimension),
            remaining_failures: AtomicU32::new(failures),
        }
    }
}

#[async_trait]
impl CorpusStore for FlakyUpsertStore {
    async fn upsert(&self, records: &[CaseRecord]) -> Result<()> {
        let remaining = self.remaining_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(CounselRagError::Http("connection reset".to_string()));
        }
        self.inner.upsert(records).await
    }

    async fn vector_query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&CorpusFilter>,
    ) -> Result<Vec<VectorMatch>> {
        self.inner.vector_query(embedding, k, filter).await
    }

    async fn delete_all(&self) -> Result<()> {
        self.inner.delete_all().await
    }

    async fn count(&self) -> Result<u64> {
        self.inner.count().await
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}

/// Build a case record with the given tags and embedding
pub fn case_record(
    id: &str,
    input: &str,
    output: &str,
    embedding: Vec<f32>,
    keywords: &[&str],
    emotions: &[&str],
) -> CaseRecord {
    CaseRecord {
        id: id.to_string(),
        input: input.to_string(),
        output: output.to_string(),
        embedding,
        keywords: keywords.iter().map(ToString::to_string).collect(),
        emotions: emotions.iter().map(ToString::to_string).collect(),
    }
}
