//! Weighted reciprocal rank fusion for merging sub-query rankings

use std::collections::HashMap;

use crate::models::RetrievalType;
use crate::models::RetrievedCase;
use crate::models::VectorMatch;

/// Standard RRF smoothing constant from the literature (Cormack et al.,
/// SIGIR 2009). Smaller values emphasize top ranks; 60 is the accepted
/// default.
pub const RRF_K: f32 = 60.0;

/// Default weight of the semantic sub-ranking
pub const SEMANTIC_WEIGHT: f32 = 0.7;

/// Default weight of the keyword sub-ranking
pub const KEYWORD_WEIGHT: f32 = 0.3;

/// One ranked sub-result list entering fusion
pub struct RankedList<'a> {
    pub matches: &'a [VectorMatch],
    pub weight: f32,
    pub source: RetrievalType,
}

/// Merge ranked lists into a deduplicated top-k result
///
/// Each item at 0-based rank `r` in a list contributes
/// `weight / (k_rrf + r + 1)`; an id present in several lists sums its
/// contributions. Lists are processed in the order given, so ties in the
/// fused score resolve by first appearance (semantic-first when the caller
/// passes the semantic list first). Output scores are monotonically
/// non-increasing.
#[must_use]
pub fn reciprocal_rank_fusion(
    lists: &[RankedList<'_>],
    top_k: usize,
    k_rrf: f32,
) -> Vec<RetrievedCase> {
    struct FusedEntry {
        score: f32,
        case: RetrievedCase,
        // (list index, rank) of first appearance, for deterministic ties
        first_seen: (usize, usize),
    }

    let mut fused: HashMap<&str, FusedEntry> = HashMap::new();

    for (list_idx, list) in lists.iter().enumerate() {
        for (rank, item) in list.matches.iter().enumerate() {
            let contribution = list.weight / (k_rrf + rank as f32 + 1.0);
            if let Some(entry) = fused.get_mut(item.id.as_str()) {
                entry.score += contribution;
            } else {
                fused.insert(
                    item.id.as_str(),
                    FusedEntry {
                        score: contribution,
                        case: RetrievedCase {
                            id: item.record.id.clone(),
                            input: item.record.input.clone(),
                            output: item.record.output.clone(),
                            keywords: item.record.keywords.clone(),
                            emotions: item.record.emotions.clone(),
                            similarity: 0.0,
                            retrieval_type: list.source,
                        },
                        first_seen: (list_idx, rank),
                    },
                );
            }
        }
    }

    let mut results: Vec<FusedEntry> = fused.into_values().collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.first_seen.cmp(&b.first_seen))
    });
    results.truncate(top_k);

    results
        .into_iter()
        .map(|entry| RetrievedCase {
            similarity: entry.score,
            ..entry.case
        })
        .collect()
}
