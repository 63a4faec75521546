use serde::Deserialize;
use serde::Serialize;

/// A unit of retrievable counseling knowledge
///
/// Created during ingestion from one dataset line; never mutated in place
/// (re-ingestion replaces by id). The embedding is produced once at
/// ingestion time and must match the deployment's configured dimension.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseRecord {
    pub id: String,
    pub input: String,
    pub output: String,
    pub embedding: Vec<f32>,
    pub keywords: Vec<String>,
    pub emotions: Vec<String>,
}

/// Which sub-query ranked a retrieved case first (informational only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetrievalType {
    /// Vector similarity match
    Semantic,
    /// Keyword-overlap match
    Keyword,
    /// Emotion-tag match
    Emotion,
}

impl std::fmt::Display for RetrievalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Semantic => write!(f, "semantic"),
            Self::Keyword => write!(f, "keyword"),
            Self::Emotion => write!(f, "emotion"),
        }
    }
}

/// A case annotated with retrieval-time metadata
///
/// The similarity is a fused rank score, comparable only within one
/// retrieval call. Constructed per query and discarded after prompt
/// assembly; never persisted.
#[derive(Debug, Clone)]
pub struct RetrievedCase {
    pub id: String,
    pub input: String,
    pub output: String,
    pub keywords: Vec<String>,
    pub emotions: Vec<String>,
    pub similarity: f32,
    pub retrieval_type: RetrievalType,
}

/// Ephemeral input to one retrieval call
#[derive(Debug, Clone)]
pub struct CaseQuery {
    pub text: String,
    pub emotions: Vec<String>,
    pub top_k: usize,
}

impl CaseQuery {
    #[must_use]
    pub fn new(text: impl Into<String>, top_k: usize) -> Self {
        Self {
            text: text.into(),
            emotions: Vec::new(),
            top_k,
        }
    }

    #[must_use]
    pub fn with_emotions(mut self, emotions: Vec<String>) -> Self {
        self.emotions = emotions;
        self
    }
}

/// One ranked hit from a corpus vector query
#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub record: CaseRecord,
}

/// Tag filter applied to a corpus vector query
///
/// A record passes when the corresponding field intersects the given set.
/// Both fields set means both must intersect.
#[derive(Debug, Clone, Default)]
pub struct CorpusFilter {
    pub emotions: Option<Vec<String>>,
    pub keywords: Option<Vec<String>>,
}

impl CorpusFilter {
    #[must_use]
    pub fn by_emotions(emotions: Vec<String>) -> Self {
        Self {
            emotions: Some(emotions),
            keywords: None,
        }
    }

    #[must_use]
    pub fn by_keywords(keywords: Vec<String>) -> Self {
        Self {
            emotions: None,
            keywords: Some(keywords),
        }
    }

    /// Whether a record's tags pass this filter
    #[must_use]
    pub fn matches(&self, record: &CaseRecord) -> bool {
        let emotion_ok = self.emotions.as_ref().map_or(true, |wanted| {
            record.emotions.iter().any(|e| wanted.contains(e))
        });
        let keyword_ok = self.keywords.as_ref().map_or(true, |wanted| {
            record.keywords.iter().any(|k| wanted.contains(k))
        });
        emotion_ok && keyword_ok
    }
}

/// Statistics from one ingestion run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestStats {
    pub total_lines: usize,
    pub parsed: usize,
    pub skipped_parse: usize,
    pub skipped_embedding: usize,
    pub uploaded: usize,
    pub batches: usize,
}

impl IngestStats {
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        if self.parsed == 0 {
            0.0
        } else {
            (self.uploaded as f64 / self.parsed as f64) * 100.0
        }
    }
}
