//! CLI command definitions and argument parsing

use clap::Parser;
use clap::Subcommand;

#[derive(Parser)]
#[command(name = "counselrag")]
#[command(about = "CounselRAG CLI for corpus ingestion and hybrid retrieval")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the corpus schema (pgvector extension, table, indexes)
    Init {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
    /// Ingest a line-delimited JSON dataset into the corpus
    Ingest {
        /// Path to the .jsonl dataset file
        file: String,
        /// First record index to process (resume point)
        #[arg(long, default_value = "0")]
        start_from: usize,
        /// Maximum records to process from start-from
        #[arg(long)]
        max_records: Option<usize>,
        /// Records per upsert batch
        #[arg(long)]
        batch_size: Option<usize>,
    },
    /// Delete all corpus records, optionally re-ingesting a capped dataset
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
        /// Dataset to re-ingest after the reset
        #[arg(long)]
        reload: Option<String>,
        /// Cap on records to re-ingest
        #[arg(long)]
        max_records: Option<usize>,
    },
    /// Retrieve similar counseling cases without generation
    Query {
        /// The query text
        text: String,
        /// Maximum number of cases to return
        #[arg(short, long)]
        top_k: Option<usize>,
        /// Comma-separated emotion tags used as a hard filter
        #[arg(short, long)]
        emotions: Option<String>,
    },
    /// Run a full RAG chat turn (retrieve + generate)
    Ask {
        /// The user message
        text: String,
        /// Maximum number of cases to retrieve
        #[arg(short, long)]
        top_k: Option<usize>,
        /// Comma-separated emotion tags used as a hard filter
        #[arg(short, long)]
        emotions: Option<String>,
        /// Persona context for the companion
        #[arg(long)]
        persona: Option<String>,
    },
    /// Show corpus statistics
    Stats,
    /// Show current configuration
    Config,
}

/// Parse a comma-separated emotion tag list
#[must_use]
pub fn parse_emotions(raw: Option<&str>) -> Vec<String> {
    raw.map_or_else(Vec::new, |s| {
        s.split(',')
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(ToString::to_string)
            .collect()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_emotions() {
        assert_eq!(
            parse_emotions(Some("anxiety, sadness,,")),
            vec!["anxiety".to_string(), "sadness".to_string()]
        );
        assert!(parse_emotions(None).is_empty());
    }
}
