//! Complete RAG pipeline: Retrieve -> Fuse -> Assemble -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::config::AppConfig;
use crate::corpus::CorpusStore;
use crate::corpus::PgCorpusStore;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::llm::LlmService;
use crate::models::CaseQuery;
use crate::models::RetrievedCase;
use crate::rag::HybridRetriever;
use crate::rag::PromptAssembler;

/// Complete RAG service for one chat turn
pub struct RagService {
    retriever: HybridRetriever,
    assembler: PromptAssembler,
    llm_service: LlmService,
}

impl RagService {
    /// Create a new RAG service over the Postgres corpus backend
    ///
    /// # Errors
    /// - Database connection errors
    /// - Embedding service configuration errors (invalid keys, endpoints)
    /// - LLM service configuration errors
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let store: Arc<dyn CorpusStore> = Arc::new(PgCorpusStore::from_config(config).await?);
        let embedder: Arc<dyn Embedder> = Arc::new(EmbeddingService::new(config)?);
        let llm_service = LlmService::new(config)?;
        Ok(Self::from_services(
            store,
            embedder,
            llm_service,
            config.retrieval.clone(),
        ))
    }

    /// Create from existing services
    #[must_use]
    pub fn from_services(
        store: Arc<dyn CorpusStore>,
        embedder: Arc<dyn Embedder>,
        llm_service: LlmService,
        retrieval: crate::config::RetrievalConfig,
    ) -> Self {
        let retriever = HybridRetriever::new(store, embedder, retrieval);
        Self {
            retriever,
            assembler: PromptAssembler::default(),
            llm_service,
        }
    }

    /// Run one full chat turn: retrieve context, then generate a response
    ///
    /// Retrieval is best-effort: when it comes back empty the reference
    /// section is omitted entirely and the generator still answers.
    pub async fn chat(&self, query: &CaseQuery, persona: Option<&str>) -> Result<ChatResponse> {
        info!("Processing chat turn: {}", query.text);

        debug!("Step 1: Retrieving similar counseling cases");
        let cases = self.retriever.retrieve(query).await;
        debug!("Retrieved {} cases", cases.len());

        debug!("Step 2: Assembling reference prompt");
        let reference_prompt = self.assembler.build_prompt(&cases, persona);

        debug!("Step 3: Generating response");
        let prompt = build_chat_prompt(&query.text, &reference_prompt);
        let answer = self.llm_service.generate(&prompt).await?;

        info!("Chat turn completed");
        Ok(ChatResponse {
            answer,
            sources: cases,
            reference_prompt,
        })
    }

    /// Retrieve cases without generation
    pub async fn search(&self, query: &CaseQuery) -> Vec<RetrievedCase> {
        self.retriever.retrieve(query).await
    }

    /// Get retriever reference
    #[must_use]
    pub const fn retriever(&self) -> &HybridRetriever {
        &self.retriever
    }
}

/// Wrap the user message and optional reference block into one prompt
///
/// An empty reference block is omitted, never injected.
fn build_chat_prompt(user_message: &str, reference_prompt: &str) -> String {
    if reference_prompt.is_empty() {
        format!(
            "You are a warm, attentive counseling companion.\n\nUser message: {user_message}\n\nRespond with empathy and practical support."
        )
    } else {
        format!(
            "You are a warm, attentive counseling companion.\n\n{reference_prompt}\nUser message: {user_message}\n\nRespond with empathy and practical support."
        )
    }
}

/// Response of one chat turn
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub answer: String,
    pub sources: Vec<RetrievedCase>,
    pub reference_prompt: String,
}

impl ChatResponse {
    /// Get a formatted string representation
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Answer:\n{}\n\n", self.answer));
        output.push_str(&format!("Sources ({} cases):\n", self.sources.len()));

        for (idx, source) in self.sources.iter().enumerate().take(5) {
            output.push_str(&format!(
                "  {}. {} (Score: {:.3}, Type: {})\n",
                idx + 1,
                source.id,
                source.similarity,
                source.retrieval_type
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_reference_block_is_omitted() {
        let prompt = build_chat_prompt("I feel low", "");
        assert!(!prompt.contains("References"));
        assert!(prompt.contains("I feel low"));
    }

    #[test]
    fn test_reference_block_included_when_present() {
        let prompt = build_chat_prompt("I feel low", "## Professional Counseling References\n");
        assert!(prompt.contains("## Professional Counseling References"));
    }
}
