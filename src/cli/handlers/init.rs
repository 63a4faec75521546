//! Schema initialization and corpus reset handlers

use std::io::stdin;

use crate::cli::output::print_info;
use crate::cli::output::print_prompt;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::corpus::CorpusStore;
use crate::corpus::PgCorpusStore;
use crate::AppConfig;
use crate::Result;

/// Handle the schema initialization command
pub async fn handle_init_command(config: &AppConfig, force: bool) -> Result<()> {
    if !force {
        print_warning("This will initialize the corpus schema and create indexes.");
        print_warning("This operation is safe - it uses CREATE IF NOT EXISTS.");
        println!("\nUse --force to proceed.");
        return Ok(());
    }

    print_info("Initializing CounselRAG corpus schema...");
    let store = PgCorpusStore::from_config(config).await?;

    match store.init_schema().await {
        Ok(()) => {
            print_success("pgvector extension enabled");
            print_success(&format!(
                "counseling_cases table ready (dimension {})",
                config.embedding_dimension()
            ));
            print_success("Vector and tag indexes created");
        }
        Err(e) => {
            if e.to_string().contains("vector") || e.to_string().contains("extension") {
                print_warning(&format!("Could not enable pgvector extension: {e}"));
                print_warning("Please run on the database server:");
                println!("  psql -d counselrag -c 'CREATE EXTENSION IF NOT EXISTS vector;'");
                println!();
                println!("Then run: counselrag init --force");
            }
            return Err(e);
        }
    }

    println!();
    print_success("Corpus initialization complete!");
    print_info("To load a dataset, run:");
    println!("   counselrag ingest data/counseling_data.jsonl");

    Ok(())
}

/// Handle the corpus reset command
pub async fn handle_reset_command(
    config: &AppConfig,
    force: bool,
    reload: Option<String>,
    max_records: Option<usize>,
) -> Result<()> {
    if !force {
        print_warning("This will DELETE ALL case records from the corpus!");
        print_prompt("Are you sure you want to continue? (y/N) ");

        let mut answer = String::new();
        stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            print_info("Reset cancelled");
            return Ok(());
        }
    }

    let store = std::sync::Arc::new(PgCorpusStore::from_config(config).await?);
    store.delete_all().await?;
    print_success("All case records deleted");

    if let Some(path) = reload {
        print_info(&format!("Re-ingesting {path}..."));
        super::ingest::run_ingestion(config, store, &path, 0, max_records, None).await?;
    }

    Ok(())
}
