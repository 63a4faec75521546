//! Statistics and configuration display handlers

use crate::cli::output::mask_database_url;
use crate::cli::output::print_info;
use crate::corpus::CorpusStore;
use crate::corpus::PgCorpusStore;
use crate::AppConfig;
use crate::Result;

/// Handle the stats command
pub async fn handle_stats_command(config: &AppConfig) -> Result<()> {
    let store = PgCorpusStore::from_config(config).await?;
    let count = store.count().await?;

    print_info("Corpus statistics");
    println!("  Records:             {count}");
    println!("  Embedding model:     {}", config.embedding_model());
    println!("  Embedding dimension: {}", config.embedding_dimension());
    println!("  Default top-k:       {}", config.retrieval_top_k());
    Ok(())
}

/// Handle the config command
pub fn handle_config_command(config: &AppConfig) {
    print_info("Current configuration");
    println!("  Database:        {}", mask_database_url(config.database_url()));
    println!("  Log level:       {}", config.logging.level);
    println!("  Embeddings:      {} ({}, dim {})",
        config.embedding_provider(),
        config.embedding_model(),
        config.embedding_dimension()
    );
    println!("  Embed endpoint:  {}", config.embedding_endpoint());
    println!("  Ingest batch:    {}", config.ingestion_batch_size());
    println!("  Record delay:    {}ms", config.ingestion_record_delay_ms());
    println!(
        "  Fusion weights:  semantic {:.2} / keyword {:.2} (k_rrf {})",
        config.retrieval.semantic_weight, config.retrieval.keyword_weight, config.retrieval.rrf_k
    );
    println!("  LLM model:       {}", config.llm_model());
    println!("  LLM endpoint:    {}", config.llm_endpoint());
}
