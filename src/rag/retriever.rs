//! Hybrid retrieval over the case corpus

use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::config::RetrievalConfig;
use crate::corpus::CorpusStore;
use crate::embeddings::Embedder;
use crate::errors::Result;
use crate::keywords::overlap_ratio;
use crate::keywords::KeywordExtractor;
use crate::models::CaseQuery;
use crate::models::CorpusFilter;
use crate::models::RetrievalType;
use crate::models::RetrievedCase;
use crate::models::VectorMatch;
use crate::rag::fusion::reciprocal_rank_fusion;
use crate::rag::fusion::RankedList;

/// Retriever combining a semantic and a keyword sub-query via weighted RRF
///
/// Retrieval is a best-effort enhancement of the conversation flow: every
/// failure below this boundary is converted into an empty result list, not
/// an error.
pub struct HybridRetriever {
    store: Arc<dyn CorpusStore>,
    embedder: Arc<dyn Embedder>,
    extractor: KeywordExtractor,
    config: RetrievalConfig,
}

impl HybridRetriever {
    /// Create a new retriever
    pub fn new(
        store: Arc<dyn CorpusStore>,
        embedder: Arc<dyn Embedder>,
        config: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            extractor: KeywordExtractor::new(),
            config,
        }
    }

    /// Retrieve the fused top-k cases for a query
    ///
    /// Returns at most `query.top_k` cases, deduplicated by id, scores
    /// non-increasing. A store or embedding failure degrades to an empty
    /// list.
    pub async fn retrieve(&self, query: &CaseQuery) -> Vec<RetrievedCase> {
        match self.try_retrieve(query).await {
            Ok(cases) => cases,
            Err(e) => {
                warn!("Retrieval failed, continuing without context: {e}");
                Vec::new()
            }
        }
    }

    async fn try_retrieve(&self, query: &CaseQuery) -> Result<Vec<RetrievedCase>> {
        if query.top_k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(&query.text).await?;
        let query_keywords = self.extractor.extract(&query.text);
        debug!(
            "Hybrid retrieval: top_k={}, keywords={:?}, emotion_filter={:?}",
            query.top_k, query_keywords, query.emotions
        );

        // Both sub-queries widen to top_k * 2 so fusion has candidates to merge
        let fetch_k = query.top_k * 2;

        let semantic_filter = if query.emotions.is_empty() {
            None
        } else {
            Some(CorpusFilter::by_emotions(query.emotions.clone()))
        };
        let keyword_filter = if query_keywords.is_empty() {
            None
        } else {
            Some(CorpusFilter::by_keywords(query_keywords.clone()))
        };

        let semantic_future = self
            .store
            .vector_query(&query_embedding, fetch_k, semantic_filter.as_ref());
        let keyword_future = async {
            // No query keywords means no lexical signal at all
            match &keyword_filter {
                Some(filter) => {
                    self.store
                        .vector_query(&query_embedding, fetch_k, Some(filter))
                        .await
                }
                None => Ok(Vec::new()),
            }
        };

        let (semantic_result, keyword_result) = tokio::join!(semantic_future, keyword_future);
        let semantic_matches = semantic_result?;
        let mut keyword_matches = keyword_result?;

        rerank_by_overlap(&mut keyword_matches, &query_keywords);

        let semantic_source = if query.emotions.is_empty() {
            RetrievalType::Semantic
        } else {
            RetrievalType::Emotion
        };

        let fused = reciprocal_rank_fusion(
            &[
                RankedList {
                    matches: &semantic_matches,
                    weight: self.config.semantic_weight,
                    source: semantic_source,
                },
                RankedList {
                    matches: &keyword_matches,
                    weight: self.config.keyword_weight,
                    source: RetrievalType::Keyword,
                },
            ],
            query.top_k,
            self.config.rrf_k,
        );

        debug!(
            "Fused {} semantic + {} keyword matches into {} cases",
            semantic_matches.len(),
            keyword_matches.len(),
            fused.len()
        );
        Ok(fused)
    }
}

/// Re-rank keyword-branch candidates by lexical overlap with the query
///
/// Overlap ratio is the primary key; the vector score breaks ties so the
/// order stays fully deterministic.
fn rerank_by_overlap(matches: &mut [VectorMatch], query_keywords: &[String]) {
    matches.sort_by(|a, b| {
        let overlap_a = overlap_ratio(query_keywords, &a.record.keywords);
        let overlap_b = overlap_ratio(query_keywords, &b.record.keywords);
        overlap_b
            .partial_cmp(&overlap_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                b.score
                    .partial_cmp(&a.score)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CaseRecord;

    fn keyword_match(id: &str, score: f32, keywords: &[&str]) -> VectorMatch {
        VectorMatch {
            id: id.to_string(),
            score,
            record: CaseRecord {
                id: id.to_string(),
                input: String::new(),
                output: String::new(),
                embedding: vec![0.1; 4],
                keywords: keywords.iter().map(ToString::to_string).collect(),
                emotions: Vec::new(),
            },
        }
    }

    #[test]
    fn test_rerank_prefers_higher_overlap() {
        let query_keywords = vec!["work".to_string(), "stress".to_string()];
        let mut matches = vec![
            keyword_match("a", 0.9, &["sleep"]),
            keyword_match("b", 0.5, &["work", "stress"]),
            keyword_match("c", 0.7, &["work"]),
        ];

        rerank_by_overlap(&mut matches, &query_keywords);
        let order: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_rerank_ties_fall_back_to_vector_score() {
        let query_keywords = vec!["work".to_string()];
        let mut matches = vec![
            keyword_match("low", 0.2, &["work"]),
            keyword_match("high", 0.8, &["work"]),
        ];

        rerank_by_overlap(&mut matches, &query_keywords);
        assert_eq!(matches[0].id, "high");
    }
}
