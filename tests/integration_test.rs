//! End-to-end flow over the in-process corpus backend:
//! ingest a dataset file, retrieve with hybrid search, assemble the prompt.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use counselrag::config::RetrievalConfig;
use counselrag::corpus::CorpusStore;
use counselrag::corpus::MemoryCorpusStore;
use counselrag::embeddings::Embedder;
use counselrag::errors::Result;
use counselrag::ingest::IngestOptions;
use counselrag::ingest::IngestionPipeline;
use counselrag::models::CaseQuery;
use counselrag::rag::HybridRetriever;
use counselrag::rag::PromptAssembler;
use counselrag::retry::RetryPolicy;

const DIM: usize = 4;

/// Embeds text as a bag of four hand-picked topic axes
struct TopicEmbedder;

#[async_trait]
impl Embedder for TopicEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        let axes = ["work", "sleep", "family", "friend"];
        let mut vector: Vec<f32> = axes
            .iter()
            .map(|axis| if lower.contains(axis) { 1.0 } else { 0.0 })
            .collect();
        if vector.iter().all(|v| *v == 0.0) {
            vector[0] = 0.1; // keep unrelated text off the zero vector
        }
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        DIM
    }
}

fn dataset() -> String {
    [
        r#"{"input": "Deadlines at work make me anxious", "output": "Let us sort what is urgent from what is loud", "keywords": ["work", "deadlines"], "emotions": ["anxiety"]}"#,
        r#"{"input": "I cannot sleep before exams", "output": "A wind-down ritual can signal safety to your body", "keywords": ["sleep", "exams"], "emotions": ["anxiety"]}"#,
        r#"{"input": "My family dinners end in arguments", "output": "Naming the pattern out loud can soften it", "keywords": ["family", "arguments"], "emotions": ["irritable"]}"#,
    ]
    .join("\n")
}

async fn ingested_store() -> Arc<MemoryCorpusStore> {
    let store = Arc::new(MemoryCorpusStore::new(DIM));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(dataset().as_bytes()).unwrap();

    let pipeline = IngestionPipeline::new(
        Arc::clone(&store) as Arc<dyn CorpusStore>,
        Arc::new(TopicEmbedder),
    )
    .with_record_delay(Duration::ZERO)
    .with_upsert_retry(RetryPolicy::new(
        2,
        Duration::from_millis(1),
        Duration::from_millis(2),
    ));

    let stats = pipeline
        .ingest_file(file.path(), &IngestOptions::default())
        .await
        .unwrap();
    assert_eq!(stats.uploaded, 3);

    store
}

#[tokio::test]
async fn test_ingest_retrieve_and_assemble() {
    let store = ingested_store().await;
    let retriever = HybridRetriever::new(
        Arc::clone(&store) as Arc<dyn CorpusStore>,
        Arc::new(TopicEmbedder),
        RetrievalConfig::default(),
    );

    let query = CaseQuery::new("Too much pressure at work lately", 2);
    let cases = retriever.retrieve(&query).await;

    assert!(!cases.is_empty());
    assert!(cases.len() <= 2);
    assert_eq!(cases[0].id, "counsel_00001");

    let prompt = PromptAssembler::default().build_prompt(&cases, Some("A gentle hatchling"));
    assert!(prompt.contains("## Professional Counseling References"));
    assert!(prompt.contains("A gentle hatchling"));
    assert!(prompt.contains("Deadlines at work make me anxious"));
}

#[tokio::test]
async fn test_emotion_filter_narrows_results() {
    let store = ingested_store().await;
    let retriever = HybridRetriever::new(
        store,
        Arc::new(TopicEmbedder),
        RetrievalConfig::default(),
    );

    let query = CaseQuery::new("Everything is overwhelming", 5)
        .with_emotions(vec!["irritable".to_string()]);
    let cases = retriever.retrieve(&query).await;

    assert!(!cases.is_empty());
    assert!(cases.iter().any(|c| c.id == "counsel_00003"));
}

#[tokio::test]
async fn test_reset_empties_the_corpus() {
    let store = ingested_store().await;
    assert_eq!(store.count().await.unwrap(), 3);

    store.delete_all().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);

    let retriever = HybridRetriever::new(
        store,
        Arc::new(TopicEmbedder),
        RetrievalConfig::default(),
    );
    let cases = retriever.retrieve(&CaseQuery::new("work pressure", 5)).await;
    assert!(cases.is_empty());
    assert_eq!(PromptAssembler::default().build_prompt(&cases, None), "");
}
