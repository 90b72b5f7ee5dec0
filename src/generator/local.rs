use std::collections::HashMap;

use async_trait::async_trait;

use super::{GeneratorError, TextGenerator, KEYWORDS_PER_PICK, MAX_TOPICS};

const STOPWORDS: &[&str] = &[
    "about", "after", "again", "also", "because", "been", "before", "being", "between", "both",
    "could", "does", "each", "even", "every", "from", "have", "here", "into", "just", "like",
    "made", "make", "many", "more", "most", "much", "must", "never", "only", "other", "over",
    "same", "should", "some", "such", "than", "that", "their", "them", "then", "there", "these",
    "they", "this", "those", "through", "very", "were", "what", "when", "where", "which", "while",
    "will", "with", "would", "your",
];

/// Deterministic word-frequency generator for development and testing.
/// Picks the most frequent non-trivial words, ties broken by first appearance.
#[derive(Debug, Clone, Default)]
pub struct LocalGenerator;

impl LocalGenerator {
    pub fn new() -> Self {
        Self
    }

    fn ranked_words(text: &str, limit: usize) -> Vec<String> {
        let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
        let words = text
            .split(|c: char| !c.is_alphanumeric())
            .map(str::to_lowercase)
            .filter(|w| w.chars().count() >= 4 && !STOPWORDS.contains(&w.as_str()))
            .filter(|w| !w.chars().all(|c| c.is_ascii_digit()));

        for (position, word) in words.enumerate() {
            counts.entry(word).or_insert((0, position)).0 += 1;
        }

        let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
        ranked.sort_by(|(_, (count_a, first_a)), (_, (count_b, first_b))| {
            count_b.cmp(count_a).then(first_a.cmp(first_b))
        });
        ranked.into_iter().take(limit).map(|(word, _)| word).collect()
    }
}

#[async_trait]
impl TextGenerator for LocalGenerator {
    async fn topics(&self, text: &str) -> Result<Vec<String>, GeneratorError> {
        Ok(Self::ranked_words(text, MAX_TOPICS))
    }

    async fn keywords(&self, text: &str) -> Result<Vec<String>, GeneratorError> {
        Ok(Self::ranked_words(text, KEYWORDS_PER_PICK))
    }
}
