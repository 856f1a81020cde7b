//! Synonym-based query expansion
//!
//! Expansion only broadens candidate gathering: the expanded text is what the
//! engine tokenizes for index lookups and scoring. Original terms are never
//! removed.

use sift_core::SynonymRule;

/// Appends configured synonyms to a query
#[derive(Debug, Clone, Default)]
pub struct QueryExpander {
    rules: Vec<SynonymRule>,
}

impl QueryExpander {
    /// Create an expander from ordered rules
    ///
    /// Keys are lower-cased; rules with an empty key are dropped since
    /// they would match every query.
    pub fn new(rules: Vec<SynonymRule>) -> Self {
        QueryExpander {
            rules: rules
                .into_iter()
                .filter(|r| !r.key.trim().is_empty())
                .map(|r| SynonymRule {
                    key: r.key.to_lowercase(),
                    terms: r.terms,
                })
                .collect(),
        }
    }

    /// Expand `text`
    ///
    /// For each rule whose key occurs (as a substring) in the lower-cased
    /// query, all of the rule's terms are appended, space separated, in rule
    /// declaration order.
    ///
    /// # Example
    ///
    /// ```
    /// use sift_core::SynonymRule;
    /// use sift_search::expand::QueryExpander;
    ///
    /// let expander = QueryExpander::new(vec![SynonymRule::new("js", vec!["javascript"])]);
    /// assert_eq!(expander.expand("JS tips"), "JS tips javascript");
    /// ```
    pub fn expand(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let mut expanded = text.to_string();
        for rule in self.rules.iter().filter(|r| lowered.contains(&r.key)) {
            for term in &rule.terms {
                expanded.push(' ');
                expanded.push_str(term);
            }
        }
        expanded
    }

    /// Number of rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if there are no rules
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expander() -> QueryExpander {
        QueryExpander::new(vec![
            SynonymRule::new("ai", vec!["artificial intelligence", "machine learning"]),
            SynonymRule::new("web", vec!["website"]),
        ])
    }

    #[test]
    fn test_no_match_returns_original() {
        assert_eq!(expander().expand("rust"), "rust");
    }

    #[test]
    fn test_appends_in_declaration_order() {
        assert_eq!(
            expander().expand("web ai"),
            "web ai artificial intelligence machine learning website"
        );
    }

    #[test]
    fn test_substring_match() {
        // "ai" occurs inside "paint"
        assert_eq!(
            expander().expand("paint"),
            "paint artificial intelligence machine learning"
        );
    }

    #[test]
    fn test_case_insensitive_key_match() {
        assert_eq!(expander().expand("WEB"), "WEB website");
        let upper = QueryExpander::new(vec![SynonymRule::new("JS", vec!["javascript"])]);
        assert_eq!(upper.expand("js"), "js javascript");
    }

    #[test]
    fn test_empty_key_ignored() {
        let e = QueryExpander::new(vec![SynonymRule::new(" ", vec!["noise"])]);
        assert!(e.is_empty());
        assert_eq!(e.expand("anything"), "anything");
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(expander().expand(""), "");
    }
}
