//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end retrieval for the counseling companion:
//! - Hybrid retrieval (semantic + keyword sub-queries) over the case corpus
//! - Weighted reciprocal rank fusion of the two rankings
//! - Bounded prompt assembly from the fused cases
//! - LLM-based response generation
//!
//! # Examples
//!
//! ```rust,no_run
//! use counselrag::config::AppConfig;
//! use counselrag::models::CaseQuery;
//! use counselrag::rag::RagService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = RagService::new(&config).await?;
//!
//!     let query = CaseQuery::new("I feel anxious about work", 5);
//!     let response = service.chat(&query, None).await?;
//!     println!("Answer: {}", response.answer);
//!     println!("Sources: {} cases", response.sources.len());
//!
//!     Ok(())
//! }
//! ```

pub mod fusion;
pub mod pipeline;
pub mod prompt;
pub mod retriever;

pub use fusion::reciprocal_rank_fusion;
pub use fusion::RankedList;
pub use fusion::KEYWORD_WEIGHT;
pub use fusion::RRF_K;
pub use fusion::SEMANTIC_WEIGHT;
pub use pipeline::ChatResponse;
pub use pipeline::RagService;
pub use prompt::PromptAssembler;
pub use retriever::HybridRetriever;
