//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the CounselRAG CLI

use crate::models::IngestStats;
use crate::models::RetrievedCase;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// This prevents panics when truncating strings with multi-byte UTF-8
/// characters (Hangul, emojis, etc.)
///
/// # Arguments
/// * `s` - The string to truncate
/// * `max_chars` - Maximum number of characters (not bytes)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print retrieved cases as a ranked list
pub fn print_case_list(cases: &[RetrievedCase]) {
    println!("Found {} relevant case(s):", cases.len());
    for (idx, case) in cases.iter().enumerate() {
        println!(
            "  {}. {} | Score: {:.3} | Type: {}",
            idx + 1,
            case.id,
            case.similarity,
            case.retrieval_type
        );
        println!("     Issue: {}", truncate_str(&case.input, 100));
        println!("     Response: {}", truncate_str(&case.output, 100));
    }
}

/// Print the summary of an ingestion run
pub fn print_ingest_stats(stats: &IngestStats) {
    println!("Ingestion summary:");
    println!("  Lines read:          {}", stats.total_lines);
    println!("  Records in window:   {}", stats.parsed);
    println!("  Parse failures:      {}", stats.skipped_parse);
    println!("  Embedding skips:     {}", stats.skipped_embedding);
    println!("  Uploaded:            {} ({} batches)", stats.uploaded, stats.batches);
    println!("  Success rate:        {:.1}%", stats.success_rate());
}

/// Mask credentials when displaying a database URL
#[must_use]
pub fn mask_database_url(url: &str) -> String {
    url.split_once('@').map_or_else(
        || "***masked***".to_string(),
        |(_, host)| format!("postgresql://***@{host}"),
    )
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    println!("❌ {msg}");
}

pub fn print_prompt(msg: &str) {
    print!("{msg}");
    std::io::Write::flush(&mut std::io::stdout()).unwrap();
}
