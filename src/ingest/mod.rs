//! Bulk ingestion of counseling datasets into the corpus
//!
//! Reads line-delimited JSON, assigns positional ids, embeds each record,
//! and upserts in batches with bounded retry. Partial completion is
//! expected: the pipeline is safe to re-run with an updated `start_from`
//! and is the sole corpus writer, run as an exclusive offline job.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;
use tracing::warn;

use crate::corpus::CorpusStore;
use crate::embeddings::is_zero_vector;
use crate::embeddings::Embedder;
use crate::errors::CounselRagError;
use crate::errors::Result;
use crate::keywords::KeywordExtractor;
use crate::models::CaseRecord;
use crate::models::IngestStats;
use crate::retry::RetryPolicy;

/// One line of the source dataset
#[derive(Debug, Deserialize)]
struct RawCaseLine {
    input: String,
    output: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    emotions: Vec<String>,
}

/// Options for one ingestion run
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// First record index (0-based, over parsed records) to process
    pub start_from: usize,
    /// Maximum records to process from `start_from`; `None` means all
    pub max_records: Option<usize>,
    /// Records per upsert batch
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            start_from: 0,
            max_records: None,
            batch_size: 50,
        }
    }
}

/// Pipeline that loads a case dataset into the corpus store
pub struct IngestionPipeline {
    store: Arc<dyn CorpusStore>,
    embedder: Arc<dyn Embedder>,
    extractor: KeywordExtractor,
    record_delay: Duration,
    upsert_retry: RetryPolicy,
}

impl IngestionPipeline {
    /// Create a new pipeline
    pub fn new(store: Arc<dyn CorpusStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            extractor: KeywordExtractor::new(),
            record_delay: Duration::from_millis(100),
            upsert_retry: RetryPolicy::ingestion_upsert(),
        }
    }

    /// Override the per-record courtesy delay between embedding calls
    #[must_use]
    pub fn with_record_delay(mut self, delay: Duration) -> Self {
        self.record_delay = delay;
        self
    }

    /// Override the upsert retry policy
    #[must_use]
    pub fn with_upsert_retry(mut self, retry: RetryPolicy) -> Self {
        self.upsert_retry = retry;
        self
    }

    /// Ingest a line-delimited JSON dataset file
    ///
    /// # Errors
    /// Aborts with `CounselRagError::Ingestion` carrying the offset of the
    /// failed batch once upsert retries are exhausted; the operator resumes
    /// with `start_from` set to that offset. Malformed lines and degenerate
    /// embeddings are logged and skipped, never fatal.
    pub async fn ingest_file<P: AsRef<Path>>(
        &self,
        path: P,
        options: &IngestOptions,
    ) -> Result<IngestStats> {
        let content = std::fs::read_to_string(&path)?;
        self.ingest_content(&content, options).await
    }

    /// Ingest dataset content that has already been read
    pub async fn ingest_content(
        &self,
        content: &str,
        options: &IngestOptions,
    ) -> Result<IngestStats> {
        let mut stats = IngestStats::default();

        let trimmed = content.trim();
        let parsed: Vec<(String, RawCaseLine)> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed
                .split('\n')
                .enumerate()
                .filter_map(|(line_idx, line)| {
                    stats.total_lines += 1;
                    match serde_json::from_str::<RawCaseLine>(line) {
                        Ok(raw) => {
                            // Positional id from the 1-based line number;
                            // a malformed line still consumes its slot
                            let id = format!("counsel_{:05}", line_idx + 1);
                            Some((id, raw))
                        }
                        Err(e) => {
                            warn!("Line {} parsing failed, skipped: {e}", line_idx + 1);
                            stats.skipped_parse += 1;
                            None
                        }
                    }
                })
                .collect()
        };

        info!("Dataset parsed: {} records", parsed.len());
        if options.start_from > 0 {
            info!("Resuming from record index {}", options.start_from);
        }

        let window_end = options
            .max_records
            .map_or(parsed.len(), |max| options.start_from.saturating_add(max))
            .min(parsed.len());
        let window: &[(String, RawCaseLine)] = if options.start_from >= parsed.len() {
            &[]
        } else {
            &parsed[options.start_from..window_end]
        };
        stats.parsed = window.len();

        let batch_size = options.batch_size.max(1);
        for (batch_idx, chunk) in window.chunks(batch_size).enumerate() {
            let batch_offset = options.start_from + batch_idx * batch_size;
            let mut batch: Vec<CaseRecord> = Vec::with_capacity(chunk.len());

            for (id, raw) in chunk {
                let keywords = if raw.keywords.is_empty() {
                    self.extractor.extract(&raw.input)
                } else {
                    raw.keywords.clone()
                };

                let embedding = match self.embedder.embed(&raw.input).await {
                    Ok(embedding) if !is_zero_vector(&embedding) => embedding,
                    Ok(_) => {
                        warn!("Embedding for {id} degenerated to zero vector, record skipped");
                        stats.skipped_embedding += 1;
                        continue;
                    }
                    Err(e) => {
                        warn!("Embedding for {id} failed, record skipped: {e}");
                        stats.skipped_embedding += 1;
                        continue;
                    }
                };

                batch.push(CaseRecord {
                    id: id.clone(),
                    input: raw.input.clone(),
                    output: raw.output.clone(),
                    embedding,
                    keywords,
                    emotions: raw.emotions.clone(),
                });

                // Rate-limit courtesy to the embedding provider
                if !self.record_delay.is_zero() {
                    tokio::time::sleep(self.record_delay).await;
                }
            }

            if batch.is_empty() {
                continue;
            }

            let store = Arc::clone(&self.store);
            let upsert_result = self
                .upsert_retry
                .run("corpus upsert", || {
                    let store = Arc::clone(&store);
                    let batch = batch.clone();
                    async move { store.upsert(&batch).await }
                })
                .await;

            if let Err(e) = upsert_result {
                return Err(CounselRagError::Ingestion {
                    offset: batch_offset,
                    message: format!(
                        "{e}; resume with --start-from {batch_offset}"
                    ),
                });
            }

            stats.uploaded += batch.len();
            stats.batches += 1;
            info!(
                "Uploaded batch {} ({}/{} records)",
                batch_idx + 1,
                stats.uploaded,
                stats.parsed
            );
        }

        info!(
            "Ingestion complete: {} uploaded, {} parse failures, {} embedding skips",
            stats.uploaded, stats.skipped_parse, stats.skipped_embedding
        );
        Ok(stats)
    }
}
