//! Text normalization and tokenization
//!
//! Pipeline: lowercase → non-word characters become spaces → collapse
//!           whitespace → split → drop single-character tokens → drop stop words
//!
//! Word characters are alphanumerics and `_`. Everything here is pure and
//! deterministic; empty input produces empty output rather than an error.

use sift_core::{SearchConfig, DEFAULT_STOP_WORDS};
use std::collections::HashSet;

#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalize text for indexing and matching
///
/// # Example
///
/// ```
/// use sift_search::tokenizer::normalize;
///
/// assert_eq!(normalize("  Spider-Man:   Homecoming! "), "spider man homecoming");
/// ```
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stop-word aware tokenizer
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: HashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Tokenizer::new(DEFAULT_STOP_WORDS.iter().copied())
    }
}

impl Tokenizer {
    /// Create a tokenizer with the given stop words
    ///
    /// Stop words are normalized the same way as the text they filter.
    pub fn new<I, S>(stop_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Tokenizer {
            stop_words: stop_words
                .into_iter()
                .map(|w| normalize(w.as_ref()))
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    /// Create a tokenizer from engine configuration
    pub fn from_config(config: &SearchConfig) -> Self {
        Tokenizer::new(&config.stop_words)
    }

    /// Check if a token is a stop word
    #[inline]
    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    /// Tokenize text into searchable terms
    ///
    /// # Example
    ///
    /// ```
    /// use sift_search::tokenizer::Tokenizer;
    ///
    /// let tokens = Tokenizer::default().tokenize("The Quick-Brown fox, a hero");
    /// assert_eq!(tokens, vec!["quick", "brown", "fox", "hero"]);
    /// ```
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        normalize(text)
            .split_whitespace()
            .filter(|t| t.chars().count() > 1)
            .filter(|t| !self.is_stop_word(t))
            .map(String::from)
            .collect()
    }

    /// Tokenize and deduplicate, keeping first occurrences in order
    pub fn tokenize_unique(&self, text: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        self.tokenize(text)
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }
}
