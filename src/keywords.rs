//! Keyword extraction from free-form counseling text
//!
//! Frequency-based and stateless: the same text with the same stopword set
//! always yields the same ordered keywords. Extraction is shared between
//! ingestion (tagging records that ship without keywords) and query time
//! (driving the keyword sub-query of hybrid retrieval).

use std::collections::HashMap;
use std::collections::HashSet;

/// Maximum number of keywords extracted from one document
pub const MAX_KEYWORDS: usize = 10;

/// Minimum token length in characters; shorter tokens carry no signal
const MIN_TOKEN_CHARS: usize = 2;

/// Korean particles plus common English function words
const DEFAULT_STOPWORDS: &[&str] = &[
    // Korean particles
    "은", "는", "이", "가", "을", "를", "에", "의", "와", "과", "도", "로", "으로",
    // English function words
    "the", "and", "for", "that", "this", "with", "was", "are", "but", "not", "you", "have",
    "had", "she", "his", "her", "they", "them", "from", "what", "when", "just", "about",
    "feel", "feeling", "really", "very",
];

/// Frequency-mode keyword extractor
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    stopwords: HashSet<String>,
}

impl KeywordExtractor {
    /// Create an extractor with the built-in stopword set
    #[must_use]
    pub fn new() -> Self {
        Self {
            stopwords: DEFAULT_STOPWORDS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Create an extractor with a custom stopword set
    #[must_use]
    pub fn with_stopwords<I, S>(stopwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stopwords: stopwords.into_iter().map(Into::into).collect(),
        }
    }

    /// Extract up to [`MAX_KEYWORDS`] terms, ranked by in-document frequency
    ///
    /// Normalization keeps Unicode alphanumerics (covers Hangul and CJK),
    /// lowercases, and tokenizes on whitespace. Ties rank by first
    /// occurrence, so the output order is fully deterministic.
    #[must_use]
    pub fn extract(&self, text: &str) -> Vec<String> {
        let normalized: String = text
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { ' ' })
            .collect::<String>()
            .to_lowercase();

        let mut frequency: HashMap<&str, usize> = HashMap::new();
        let mut first_seen: Vec<&str> = Vec::new();

        for token in normalized.split_whitespace() {
            if token.chars().count() < MIN_TOKEN_CHARS || self.stopwords.contains(token) {
                continue;
            }
            let count = frequency.entry(token).or_insert(0);
            if *count == 0 {
                first_seen.push(token);
            }
            *count += 1;
        }

        let mut ranked: Vec<(usize, &str)> = first_seen
            .iter()
            .enumerate()
            .map(|(order, &token)| (order, token))
            .collect();
        ranked.sort_by(|(order_a, token_a), (order_b, token_b)| {
            frequency[token_b]
                .cmp(&frequency[token_a])
                .then(order_a.cmp(order_b))
        });

        ranked
            .into_iter()
            .take(MAX_KEYWORDS)
            .map(|(_, token)| token.to_string())
            .collect()
    }
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Ratio of query keywords matched by a record's keyword set, in `[0, 1]`
#[must_use]
pub fn overlap_ratio(query_keywords: &[String], record_keywords: &[String]) -> f32 {
    if query_keywords.is_empty() {
        return 0.0;
    }
    let matched = query_keywords
        .iter()
        .filter(|k| record_keywords.contains(k))
        .count();
    matched as f32 / query_keywords.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = KeywordExtractor::new();
        let text = "work stress keeps piling up, work deadlines and stress at work";
        let first = extractor.extract(text);
        let second = extractor.extract(text);
        assert_eq!(first, second);
        assert_eq!(first[0], "work"); // highest frequency wins
    }

    #[test]
    fn test_frequency_then_first_occurrence_order() {
        let extractor = KeywordExtractor::with_stopwords(Vec::<String>::new());
        let keywords = extractor.extract("alpha beta beta gamma alpha delta");
        // alpha and beta both appear twice; alpha occurred first
        assert_eq!(keywords[0], "alpha");
        assert_eq!(keywords[1], "beta");
        assert_eq!(keywords[2], "gamma");
        assert_eq!(keywords[3], "delta");
    }

    #[test]
    fn test_stopwords_and_short_tokens_dropped() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("I am so anxious about the interview");
        assert!(!keywords.contains(&"the".to_string()));
        assert!(!keywords.iter().any(|k| k.chars().count() < 2));
        assert!(keywords.contains(&"anxious".to_string()));
    }

    #[test]
    fn test_punctuation_stripped_and_lowercased() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("Sleep?! SLEEP... sleep.");
        assert_eq!(keywords, vec!["sleep".to_string()]);
    }

    #[test]
    fn test_korean_particles_filtered() {
        let extractor = KeywordExtractor::new();
        let keywords = extractor.extract("직장은 스트레스 때문에 스트레스 받아요");
        assert!(keywords.contains(&"스트레스".to_string()));
        assert!(!keywords.contains(&"은".to_string()));
        assert_eq!(keywords[0], "스트레스");
    }

    #[test]
    fn test_caps_at_max_keywords() {
        let extractor = KeywordExtractor::with_stopwords(Vec::<String>::new());
        let text = (0..30).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ");
        assert_eq!(extractor.extract(&text).len(), MAX_KEYWORDS);
    }

    #[test]
    fn test_empty_text_yields_no_keywords() {
        let extractor = KeywordExtractor::new();
        assert!(extractor.extract("").is_empty());
        assert!(extractor.extract("   ...   ").is_empty());
    }

    #[test]
    fn test_overlap_ratio() {
        let query = vec!["work".to_string(), "stress".to_string()];
        let record = vec!["stress".to_string(), "sleep".to_string()];
        assert!((overlap_ratio(&query, &record) - 0.5).abs() < f32::EPSILON);
        assert!((overlap_ratio(&[], &record)).abs() < f32::EPSILON);
    }
}
