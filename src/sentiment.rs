// src/sentiment.rs
//! Naive keyword sentiment: counts substring hits of a negative and a positive word list.
//!
//! Matching is plain substring containment on the lower-cased message, so "disgusting"
//! hits "disgust" and "sucks" hits both "suck" and "sucks". Ties (including no hits at
//! all) resolve to positive.

use serde::{Deserialize, Serialize};

use crate::config::{LexiconConfig, MoodConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
}

impl Sentiment {
    pub fn is_positive(self) -> bool {
        matches!(self, Sentiment::Positive)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
        }
    }
}

/// Raw hit counts behind a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SentimentHits {
    pub positive: usize,
    pub negative: usize,
}

impl SentimentHits {
    pub fn verdict(&self) -> Sentiment {
        if self.negative > self.positive {
            Sentiment::Negative
        } else {
            // strictly more positive hits, or a tie
            Sentiment::Positive
        }
    }
}

#[derive(Debug, Clone)]
pub struct SentimentClassifier {
    negative: Vec<String>,
    positive: Vec<String>,
}

impl Default for SentimentClassifier {
    fn default() -> Self {
        Self::from_lexicon(&MoodConfig::default().lexicon)
    }
}

impl SentimentClassifier {
    /// Words are expected lower-case (config loading normalizes them).
    pub fn from_lexicon(lexicon: &LexiconConfig) -> Self {
        Self {
            negative: lexicon.negative.clone(),
            positive: lexicon.positive.clone(),
        }
    }

    pub fn hits(&self, text: &str) -> SentimentHits {
        let lower = text.to_lowercase();
        SentimentHits {
            positive: count_hits(&lower, &self.positive),
            negative: count_hits(&lower, &self.negative),
        }
    }

    pub fn classify(&self, text: &str) -> Sentiment {
        self.hits(text).verdict()
    }
}

/// Sum of non-overlapping occurrences of every word in `haystack`.
fn count_hits(haystack: &str, words: &[String]) -> usize {
    words
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| haystack.matches(w.as_str()).count())
        .sum()
}

/// Short anonymized id for a message, so logs never carry raw user text.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
