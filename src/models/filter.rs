//! Search-term projection of the catalog
//!
//! The projection keeps every catalog id whose lowercase form contains the
//! search term and orders them in three buckets: exact matches, prefix
//! matches, then the remaining substring matches. Each bucket keeps catalog
//! order.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Case-folded, trimmed search text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(text: &str) -> Self {
        Self(text.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, id: &str) -> bool {
        self.is_empty() || id.to_lowercase().contains(&self.0)
    }
}

/// Ids that pass the search term, in catalog order
pub fn visible(catalog: &[String], term: &SearchTerm) -> Vec<String> {
    catalog
        .iter()
        .filter(|id| term.matches(id))
        .cloned()
        .collect()
}

/// Visible ids re-ranked into exact, prefix and substring buckets
pub fn project(catalog: &[String], term: &SearchTerm) -> Vec<String> {
    if term.is_empty() {
        return catalog.to_vec();
    }

    let needle = term.as_str();
    let mut exact = Vec::new();
    let mut prefix = Vec::new();
    let mut rest = Vec::new();

    for id in catalog {
        let folded = id.to_lowercase();
        if folded == needle {
            exact.push(id.clone());
        } else if folded.starts_with(needle) {
            prefix.push(id.clone());
        } else if folded.contains(needle) {
            rest.push(id.clone());
        }
    }

    exact.extend(prefix);
    exact.extend(rest);
    exact
}

/// Holds the live search term for the chat picker
#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    term: SearchTerm,
}

impl ModelFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(&self) -> &SearchTerm {
        &self.term
    }

    /// Store a new term; returns whether it differs from the previous one.
    /// Recomputing the projection is left to the caller.
    pub fn set_search_term(&mut self, text: &str) -> bool {
        let term = SearchTerm::new(text);
        if term == self.term {
            return false;
        }
        self.term = term;
        true
    }

    pub fn project(&self, catalog: &[String]) -> Vec<String> {
        project(catalog, &self.term)
    }
}

/// What a picker selects when its list is replaced and the previously
/// selected value is no longer in it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionPolicy {
    /// Show no selection
    #[default]
    Clear,
    /// Select the first item
    First,
    /// Select the item at `len / 2`
    Middle,
}

impl SelectionPolicy {
    /// Fallback index for a list of `len` items
    pub fn fallback_index(&self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        match self {
            SelectionPolicy::Clear => None,
            SelectionPolicy::First => Some(0),
            SelectionPolicy::Middle => Some(len / 2),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::Clear => "clear",
            SelectionPolicy::First => "first",
            SelectionPolicy::Middle => "middle",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(SelectionPolicy::Clear),
            "first" => Ok(SelectionPolicy::First),
            "middle" => Ok(SelectionPolicy::Middle),
            other => Err(format!(
                "unknown selection policy '{}' (expected clear, first or middle)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn catalog(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_search_term_is_trimmed_and_folded() {
        assert_eq!(SearchTerm::new("  GPT-4 ").as_str(), "gpt-4");
        assert!(SearchTerm::new("   ").is_empty());
    }

    #[test]
    fn test_gpt4_scenario() {
        let models = catalog(&["gpt-4", "gpt-4-mini", "gpt-3.5"]);
        let projected = project(&models, &SearchTerm::new("gpt-4"));
        assert_eq!(projected, catalog(&["gpt-4", "gpt-4-mini"]));
    }

    #[test]
    fn test_empty_term_is_identity() {
        let models = catalog(&["b", "a", "c"]);
        assert_eq!(project(&models, &SearchTerm::default()), models);
        assert_eq!(visible(&models, &SearchTerm::default()), models);
    }

    #[rstest]
    #[case("llama", &["llama", "llama3", "llama-3.1-8b", "codellama", "tinyllama"])]
    #[case("LLAMA3", &["llama3"])]
    #[case("mini", &["gpt-4o-mini", "o1-mini"])]
    #[case("zzz", &[])]
    fn test_bucket_order(#[case] term: &str, #[case] expected: &[&str]) {
        let models = catalog(&[
            "codellama",
            "gpt-4o-mini",
            "llama3",
            "tinyllama",
            "llama",
            "o1-mini",
            "llama-3.1-8b",
        ]);
        assert_eq!(project(&models, &SearchTerm::new(term)), catalog(expected));
    }

    #[test]
    fn test_projection_is_permutation_of_visible() {
        let models = catalog(&["Mistral-Large", "mistral", "open-mistral-7b", "mixtral", "mistral-small"]);
        let term = SearchTerm::new("Mistral");

        let mut projected = project(&models, &term);
        let mut shown = visible(&models, &term);
        assert_eq!(projected.len(), shown.len());
        projected.sort();
        shown.sort();
        assert_eq!(projected, shown);
    }

    #[test]
    fn test_case_insensitive_exact_bucket() {
        let models = catalog(&["mistral-small", "Mistral"]);
        let projected = project(&models, &SearchTerm::new("mistral"));
        assert_eq!(projected, catalog(&["Mistral", "mistral-small"]));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let models = catalog(&["gpt-4o", "gpt-4", "chatgpt-4o-latest"]);
        let term = SearchTerm::new("gpt-4");
        let once = project(&models, &term);
        assert_eq!(project(&models, &term), once);
    }

    #[test]
    fn test_filter_reports_changes() {
        let mut filter = ModelFilter::new();
        assert!(filter.set_search_term("GPT"));
        assert!(!filter.set_search_term(" gpt "));
        assert!(filter.set_search_term(""));
        assert!(filter.term().is_empty());
    }

    #[rstest]
    #[case(SelectionPolicy::Clear, 5, None)]
    #[case(SelectionPolicy::First, 5, Some(0))]
    #[case(SelectionPolicy::Middle, 5, Some(2))]
    #[case(SelectionPolicy::Middle, 4, Some(2))]
    #[case(SelectionPolicy::First, 0, None)]
    fn test_fallback_index(
        #[case] policy: SelectionPolicy,
        #[case] len: usize,
        #[case] expected: Option<usize>,
    ) {
        assert_eq!(policy.fallback_index(len), expected);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("Middle".parse::<SelectionPolicy>(), Ok(SelectionPolicy::Middle));
        assert!("random".parse::<SelectionPolicy>().is_err());
    }
}
