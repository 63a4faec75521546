//! Corpus store: the persisted collection of counseling cases
//!
//! The core logic only ever sees the [`CorpusStore`] trait. The production
//! backend is Postgres + pgvector ([`PgCorpusStore`]); the in-process
//! backend ([`MemoryCorpusStore`]) serves local development and the crate's
//! own tests. Score semantics are fixed per backend for the lifetime of one
//! corpus: higher is more similar (both backends use cosine similarity).

pub mod memory;
pub mod pg;

pub use memory::MemoryCorpusStore;
pub use pg::PgCorpusStore;

use async_trait::async_trait;

use crate::errors::Result;
use crate::models::CaseRecord;
use crate::models::CorpusFilter;
use crate::models::VectorMatch;

/// Vector-storage capability required by ingestion and retrieval
#[async_trait]
pub trait CorpusStore: Send + Sync {
    /// Insert or replace records by id
    async fn upsert(&self, records: &[CaseRecord]) -> Result<()>;

    /// Rank the `k` most similar records, optionally restricted by tag filter
    async fn vector_query(
        &self,
        embedding: &[f32],
        k: usize,
        filter: Option<&CorpusFilter>,
    ) -> Result<Vec<VectorMatch>>;

    /// Remove every record (full corpus reset)
    async fn delete_all(&self) -> Result<()>;

    /// Number of records currently persisted
    async fn count(&self) -> Result<u64>;

    /// Embedding dimension this store was configured with
    ///
    /// Records or queries with a different dimension are a fatal
    /// configuration error, not a retryable one.
    fn dimension(&self) -> usize;
}

/// Reject embeddings whose length does not match the configured dimension
pub(crate) fn check_dimension(expected: usize, embedding: &[f32], context: &str) -> Result<()> {
    if embedding.len() != expected {
        return Err(crate::CounselRagError::Config(format!(
            "{context}: embedding dimension {} does not match configured dimension {expected}",
            embedding.len()
        )));
    }
    Ok(())
}
