//! Highlighting and snippet extraction
//!
//! Only run for the page of results being returned, never for every
//! candidate. Matching is whole-word and case-insensitive: content is passed
//! through the same normalizer as the index before comparing.

use crate::tokenizer::normalize;
use sift_core::{MatchedField, SearchableItem};
use std::collections::HashSet;

const ELLIPSIS: &str = "...";

/// Highlight output for one piece of content
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Highlight {
    /// Distinct query tokens found in the content, in query order
    pub highlights: Vec<String>,
    /// Sentence with the most distinct matches, possibly truncated
    pub snippet: String,
}

/// Extracts highlights and snippets
#[derive(Debug, Clone)]
pub struct Highlighter {
    max_snippet_len: usize,
}

impl Default for Highlighter {
    fn default() -> Self {
        Highlighter::new(150)
    }
}

impl Highlighter {
    /// Create a highlighter truncating snippets to `max_snippet_len` chars
    pub fn new(max_snippet_len: usize) -> Self {
        Highlighter { max_snippet_len }
    }

    /// Highlight `content` for the given query tokens
    ///
    /// Sentences are split on `.`, `!` and `?`. The sentence matching the most
    /// distinct query tokens becomes the snippet; the first one wins a tie,
    /// so content with no matches at all yields its first sentence.
    ///
    /// # Example
    ///
    /// ```
    /// use sift_search::highlight::Highlighter;
    ///
    /// let tokens = vec!["rust".to_string(), "index".to_string()];
    /// let h = Highlighter::default().highlight(&tokens, "Intro text. Rust builds the index! Bye.");
    /// assert_eq!(h.highlights, vec!["rust", "index"]);
    /// assert_eq!(h.snippet, "Rust builds the index");
    /// ```
    pub fn highlight(&self, query_tokens: &[String], content: &str) -> Highlight {
        let highlights = terms_in(query_tokens, content);

        let mut best: Option<(&str, usize)> = None;
        for sentence in content.split(['.', '!', '?']).map(str::trim) {
            if sentence.is_empty() {
                continue;
            }
            let sentence_words = word_set(sentence);
            let matches = query_tokens
                .iter()
                .map(String::as_str)
                .filter(|t| sentence_words.contains(*t))
                .collect::<HashSet<_>>()
                .len();
            if best.map_or(true, |(_, n)| matches > n) {
                best = Some((sentence, matches));
            }
        }

        Highlight {
            highlights,
            snippet: best
                .map(|(s, _)| truncate(s, self.max_snippet_len))
                .unwrap_or_default(),
        }
    }

    /// Highlight a whole item
    ///
    /// Highlights are taken from the item's full searchable text; the snippet
    /// comes from its body (content, else description, else title).
    pub fn highlight_item(&self, query_tokens: &[String], item: &SearchableItem) -> Highlight {
        let body = [&item.content, &item.description, &item.title]
            .into_iter()
            .find(|s| !s.trim().is_empty())
            .map_or("", String::as_str);
        Highlight {
            highlights: terms_in(query_tokens, &item.searchable_text()),
            snippet: self.highlight(query_tokens, body).snippet,
        }
    }

    /// Item fields containing at least one query token as a whole word
    pub fn matched_fields(&self, query_tokens: &[String], item: &SearchableItem) -> Vec<MatchedField> {
        let hit = |text: &str| {
            let words = word_set(text);
            query_tokens.iter().any(|t| words.contains(t.as_str()))
        };

        let mut fields = Vec::new();
        if hit(&item.title) {
            fields.push(MatchedField::Title);
        }
        if hit(&item.description) {
            fields.push(MatchedField::Description);
        }
        if hit(&item.content) {
            fields.push(MatchedField::Content);
        }
        if item.tags.iter().any(|tag| hit(tag)) {
            fields.push(MatchedField::Tags);
        }
        if item.category.as_deref().map_or(false, hit) {
            fields.push(MatchedField::Category);
        }
        fields
    }
}

/// Distinct query tokens present in `text` as whole words, in query order
fn terms_in(query_tokens: &[String], text: &str) -> Vec<String> {
    let words = word_set(text);
    let mut seen = HashSet::new();
    query_tokens
        .iter()
        .filter(|t| words.contains(t.as_str()) && seen.insert(t.as_str()))
        .cloned()
        .collect()
}

fn word_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(String::from)
        .collect()
}

/// Cut to `max_len` chars on a char boundary, appending an ellipsis if cut
fn truncate(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((byte_idx, _)) => format!("{}{}", &text[..byte_idx], ELLIPSIS),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_core::ItemType;

    fn toks(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_highlights_whole_words_only() {
        let h = Highlighter::default().highlight(&toks(&["art", "oil"]), "Smart oil painting");
        assert_eq!(h.highlights, vec!["oil"]);
    }

    #[test]
    fn test_highlights_case_insensitive_and_distinct() {
        let h = Highlighter::default().highlight(&toks(&["spider", "spider"]), "SPIDER-man. Spider!");
        assert_eq!(h.highlights, vec!["spider"]);
    }

    #[test]
    fn test_snippet_picks_most_matches() {
        let content = "Rust is here. Nothing else. Rust index engine.";
        let h = Highlighter::default().highlight(&toks(&["rust", "index"]), content);
        assert_eq!(h.snippet, "Rust index engine");
    }

    #[test]
    fn test_snippet_tie_takes_first() {
        let content = "First rust. Second rust.";
        let h = Highlighter::default().highlight(&toks(&["rust"]), content);
        assert_eq!(h.snippet, "First rust");
    }

    #[test]
    fn test_snippet_without_matches_is_first_sentence() {
        let h = Highlighter::default().highlight(&toks(&["zzz"]), "Opening line. Another one.");
        assert_eq!(h.snippet, "Opening line");
        assert!(h.highlights.is_empty());
    }

    #[test]
    fn test_snippet_truncated_with_ellipsis() {
        let content = "word ".repeat(50);
        let h = Highlighter::new(10).highlight(&toks(&["word"]), &content);
        assert_eq!(h.snippet, "word word ...");
        assert_eq!(h.snippet.chars().count(), 13);
    }

    #[test]
    fn test_truncate_multibyte_boundary() {
        assert_eq!(truncate("éééé", 2), "éé...");
        assert_eq!(truncate("éé", 2), "éé");
    }

    #[test]
    fn test_empty_content() {
        let h = Highlighter::default().highlight(&toks(&["rust"]), "");
        assert_eq!(h, Highlight::default());
    }

    #[test]
    fn test_highlight_item_uses_body_for_snippet() {
        let item = SearchableItem::new("1", ItemType::Artwork, "Sunset")
            .with_description("Warm oil colors. Evening light.")
            .with_tags(["landscape"]);

        let h = Highlighter::default().highlight_item(&toks(&["landscape", "evening"]), &item);
        assert_eq!(h.highlights, vec!["landscape", "evening"]);
        assert_eq!(h.snippet, "Evening light");
    }

    #[test]
    fn test_matched_fields() {
        let item = SearchableItem::new("1", ItemType::Project, "Rust engine")
            .with_description("Fast search")
            .with_content("Written in rust")
            .with_tags(["search-engine"])
            .with_category("Systems");

        let fields = Highlighter::default().matched_fields(&toks(&["rust", "engine"]), &item);
        assert_eq!(
            fields,
            vec![MatchedField::Title, MatchedField::Content, MatchedField::Tags]
        );
    }
}
