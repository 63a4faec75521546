//! Hybrid retrieval scenario tests

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::corpus::CorpusStore;
use crate::corpus::MemoryCorpusStore;
use crate::models::CaseQuery;
use crate::rag::HybridRetriever;
use crate::rag::PromptAssembler;
use crate::tests::fixtures::case_record;
use crate::tests::fixtures::FailingStore;
use crate::tests::fixtures::StaticEmbedder;

const DIM: usize = 4;

fn retriever_over(store: Arc<MemoryCorpusStore>, embedder: StaticEmbedder) -> HybridRetriever {
    HybridRetriever::new(store, Arc::new(embedder), RetrievalConfig::default())
}

async fn anxiety_corpus() -> Arc<MemoryCorpusStore> {
    let store = Arc::new(MemoryCorpusStore::new(DIM));
    store
        .upsert(&[
            case_record(
                "counsel_00001",
                "Work anxiety keeps me up at night",
                "Let's start by naming what feels most out of control",
                vec![1.0, 0.0, 0.0, 0.0],
                &["work", "anxiety"],
                &["anxiety"],
            ),
            case_record(
                "counsel_00002",
                "My roommate eats my leftovers",
                "Boundaries can be set kindly but firmly",
                vec![0.0, 1.0, 0.0, 0.0],
                &["roommate", "food"],
                &["irritable"],
            ),
        ])
        .await
        .unwrap();
    store
}

#[tokio::test]
async fn test_matching_case_ranks_first_with_higher_score() {
    let store = anxiety_corpus().await;
    let embedder = StaticEmbedder::new(DIM).map("anxious", vec![0.9, 0.1, 0.0, 0.0]);
    let retriever = retriever_over(store, embedder);

    let query = CaseQuery::new("I feel anxious about work", 5);
    let cases = retriever.retrieve(&query).await;

    assert!(!cases.is_empty());
    assert_eq!(cases[0].id, "counsel_00001");
    if let Some(second) = cases.get(1) {
        assert!(cases[0].similarity > second.similarity);
    }
}

#[tokio::test]
async fn test_top_k_bound_holds_for_all_k() {
    let store = Arc::new(MemoryCorpusStore::new(DIM));
    let records: Vec<_> = (0..10)
        .map(|i| {
            case_record(
                &format!("counsel_{:05}", i + 1),
                &format!("concern number {i}"),
                "a response",
                vec![1.0, i as f32 * 0.1, 0.0, 0.0],
                &["concern"],
                &[],
            )
        })
        .collect();
    store.upsert(&records).await.unwrap();

    for top_k in [0, 1, 3, 10, 50] {
        let embedder = StaticEmbedder::new(DIM);
        let retriever = retriever_over(Arc::clone(&store), embedder);
        let cases = retriever
            .retrieve(&CaseQuery::new("concern concern", top_k))
            .await;
        assert!(cases.len() <= top_k, "top_k={top_k} returned {}", cases.len());
    }
}

#[tokio::test]
async fn test_results_deduplicated_and_non_increasing() {
    let store = anxiety_corpus().await;
    let embedder = StaticEmbedder::new(DIM).map("anxious", vec![0.9, 0.1, 0.0, 0.0]);
    let retriever = retriever_over(store, embedder);

    // Both sub-queries match counsel_00001; it must appear once
    let cases = retriever
        .retrieve(&CaseQuery::new("I feel anxious about work", 5))
        .await;
    let mut ids: Vec<&str> = cases.iter().map(|c| c.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), cases.len());

    for window in cases.windows(2) {
        assert!(window[0].similarity >= window[1].similarity);
    }
}

#[tokio::test]
async fn test_empty_corpus_returns_empty_and_prompt_omitted() {
    let store = Arc::new(MemoryCorpusStore::new(DIM));
    let retriever = retriever_over(store, StaticEmbedder::new(DIM));

    let cases = retriever.retrieve(&CaseQuery::new("anything at all", 5)).await;
    assert!(cases.is_empty());

    let prompt = PromptAssembler::default().build_prompt(&cases, None);
    assert_eq!(prompt, "");
}

#[tokio::test]
async fn test_store_failure_degrades_to_empty() {
    let store = Arc::new(FailingStore::new(DIM));
    let retriever = HybridRetriever::new(
        store,
        Arc::new(StaticEmbedder::new(DIM)),
        RetrievalConfig::default(),
    );

    let cases = retriever.retrieve(&CaseQuery::new("anything at all", 5)).await;
    assert!(cases.is_empty());
}

#[tokio::test]
async fn test_emotion_filter_is_hard_on_semantic_branch() {
    let store = anxiety_corpus().await;
    let embedder = StaticEmbedder::new(DIM).map("anxious", vec![0.9, 0.1, 0.0, 0.0]);
    let retriever = retriever_over(store, embedder);

    // No case carries the requested tag; keyword branch still contributes
    let query = CaseQuery::new("I feel anxious about work", 5)
        .with_emotions(vec!["boredom".to_string()]);
    let cases = retriever.retrieve(&query).await;
    assert!(!cases.is_empty());
    assert!(cases.iter().all(|c| c.id == "counsel_00001"));

    // A matching tag narrows the semantic branch to the tagged case
    let query = CaseQuery::new("I feel anxious about work", 5)
        .with_emotions(vec!["anxiety".to_string()]);
    let cases = retriever.retrieve(&query).await;
    assert_eq!(cases[0].id, "counsel_00001");
}
