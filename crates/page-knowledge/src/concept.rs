//! Concept normalization and field lookup

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Normalize a concept name: lowercase, `_`/`-` as spaces, single spaces.
pub fn normalize_concept(raw: &str) -> String {
    raw.to_lowercase()
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Does `concept` name the site-wide search box (`search`, `search term`, ...)?
pub fn is_search_concept(concept: &str, search_concept: &str) -> bool {
    let normalized = normalize_concept(concept);
    normalized == normalize_concept(search_concept)
        || normalized == "search"
        || normalized.starts_with("search ")
}

/// How a concept matched a field key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchKind {
    Exact,
    Containment,
}

/// Result of looking a concept up in a field map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMatch {
    pub key: String,
    pub locator: String,
    pub kind: MatchKind,
}

/// Exact match first, then bidirectional substring containment in map order.
pub(crate) fn lookup(fields: &IndexMap<String, String>, concept: &str) -> Option<FieldMatch> {
    let needle = normalize_concept(concept);
    if needle.is_empty() {
        return None;
    }
    if let Some(locator) = fields.get(&needle) {
        return Some(FieldMatch {
            key: needle,
            locator: locator.clone(),
            kind: MatchKind::Exact,
        });
    }
    fields
        .iter()
        .find(|(key, _)| key.contains(needle.as_str()) || needle.contains(key.as_str()))
        .map(|(key, locator)| FieldMatch {
            key: key.clone(),
            locator: locator.clone(),
            kind: MatchKind::Containment,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> IndexMap<String, String> {
        let mut map = IndexMap::new();
        map.insert("loan amount".to_string(), "cloanamount".to_string());
        map.insert("interest rate".to_string(), "cinterestrate".to_string());
        map
    }

    #[test]
    fn normalizes_separators_and_case() {
        assert_eq!(normalize_concept("  Loan_Amount "), "loan amount");
        assert_eq!(normalize_concept("trade-in   value"), "trade in value");
    }

    #[test]
    fn exact_then_containment() {
        let map = fields();
        let exact = lookup(&map, "Loan_Amount").unwrap();
        assert_eq!(exact.kind, MatchKind::Exact);
        assert_eq!(exact.locator, "cloanamount");

        let contained = lookup(&map, "the interest rate field").unwrap();
        assert_eq!(contained.kind, MatchKind::Containment);
        assert_eq!(contained.locator, "cinterestrate");

        let reverse = lookup(&map, "rate").unwrap();
        assert_eq!(reverse.locator, "cinterestrate");

        assert!(lookup(&map, "down payment").is_none());
        assert!(lookup(&map, "   ").is_none());
    }

    #[test]
    fn search_concepts() {
        assert!(is_search_concept("Search_Term", "search term"));
        assert!(is_search_concept("search box", "search term"));
        assert!(is_search_concept("site query", "site query"));
        assert!(!is_search_concept("research budget", "search term"));
    }
}
