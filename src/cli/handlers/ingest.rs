//! Bulk ingestion command handler

use std::sync::Arc;
use std::time::Duration;

use crate::cli::output::print_error;
use crate::cli::output::print_info;
use crate::cli::output::print_ingest_stats;
use crate::cli::output::print_success;
use crate::corpus::CorpusStore;
use crate::corpus::PgCorpusStore;
use crate::embeddings::EmbeddingService;
use crate::errors::CounselRagError;
use crate::ingest::IngestOptions;
use crate::ingest::IngestionPipeline;
use crate::AppConfig;
use crate::Result;

/// Handle the ingest command
pub async fn handle_ingest_command(
    config: &AppConfig,
    file: String,
    start_from: usize,
    max_records: Option<usize>,
    batch_size: Option<usize>,
) -> Result<()> {
    let store = Arc::new(PgCorpusStore::from_config(config).await?);
    run_ingestion(config, store, &file, start_from, max_records, batch_size).await
}

/// Run one ingestion pass over the given store
///
/// Shared between `ingest` and `reset --reload`.
pub async fn run_ingestion(
    config: &AppConfig,
    store: Arc<dyn CorpusStore>,
    file: &str,
    start_from: usize,
    max_records: Option<usize>,
    batch_size: Option<usize>,
) -> Result<()> {
    print_info(&format!("Ingesting dataset: {file}"));

    let embedder = Arc::new(EmbeddingService::new(config)?);
    let pipeline = IngestionPipeline::new(store, embedder)
        .with_record_delay(Duration::from_millis(config.ingestion_record_delay_ms()));

    let options = IngestOptions {
        start_from,
        max_records,
        batch_size: batch_size.unwrap_or_else(|| config.ingestion_batch_size()),
    };

    match pipeline.ingest_file(file, &options).await {
        Ok(stats) => {
            print_ingest_stats(&stats);
            print_success("Ingestion completed");
            Ok(())
        }
        Err(CounselRagError::Ingestion { offset, message }) => {
            print_error(&format!("Ingestion aborted: {message}"));
            print_info("To resume from the failed batch, run:");
            println!("   counselrag ingest {file} --start-from {offset}");
            Err(CounselRagError::Ingestion { offset, message })
        }
        Err(e) => Err(e),
    }
}
