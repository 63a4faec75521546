//! Retrieval and chat command handlers

use std::sync::Arc;

use crate::cli::commands::parse_emotions;
use crate::cli::output::print_case_list;
use crate::cli::output::print_info;
use crate::cli::output::print_warning;
use crate::corpus::CorpusStore;
use crate::corpus::PgCorpusStore;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::llm::LlmService;
use crate::models::CaseQuery;
use crate::rag::HybridRetriever;
use crate::rag::RagService;
use crate::AppConfig;
use crate::Result;

/// Handle the retrieval-only query command
pub async fn handle_query_command(
    config: &AppConfig,
    text: String,
    top_k: Option<usize>,
    emotions: Option<String>,
) -> Result<()> {
    print_info(&format!("Retrieving cases for: \"{text}\""));

    let store: Arc<dyn CorpusStore> = Arc::new(PgCorpusStore::from_config(config).await?);
    let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(config)?);
    let retriever = HybridRetriever::new(store, embedder, config.retrieval.clone());

    let query = CaseQuery::new(text, top_k.unwrap_or_else(|| config.retrieval_top_k()))
        .with_emotions(parse_emotions(emotions.as_deref()));

    let cases = retriever.retrieve(&query).await;
    if cases.is_empty() {
        print_warning("No relevant cases found");
        return Ok(());
    }

    print_case_list(&cases);
    Ok(())
}

/// Handle the full RAG chat command
pub async fn handle_ask_command(
    config: &AppConfig,
    text: String,
    top_k: Option<usize>,
    emotions: Option<String>,
    persona: Option<String>,
) -> Result<()> {
    print_info(&format!("Chat turn: \"{text}\""));

    let store: Arc<dyn CorpusStore> = Arc::new(PgCorpusStore::from_config(config).await?);
    let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(config)?);
    let llm_service = LlmService::new(config)?;
    let service = RagService::from_services(store, embedder, llm_service, config.retrieval.clone());

    let query = CaseQuery::new(text, top_k.unwrap_or_else(|| config.retrieval_top_k()))
        .with_emotions(parse_emotions(emotions.as_deref()));

    let response = service.chat(&query, persona.as_deref()).await?;
    println!("{}", response.format());
    Ok(())
}
