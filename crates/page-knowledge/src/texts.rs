//! Known-good display text registry

use std::collections::{BTreeMap, BTreeSet};

/// Outcome of checking an asserted display text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Present exactly as asserted
    Exact,
    /// Present with different casing; carries the registry spelling
    CaseInsensitive(String),
    /// Not observed on the page
    Missing,
}

/// Display texts observed on one page (page texts first, then site texts).
#[derive(Debug, Clone, Default)]
pub struct TextRegistry {
    exact: BTreeSet<String>,
    folded: BTreeMap<String, String>,
}

impl TextRegistry {
    pub fn new<'a, I>(texts: I) -> Self
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut registry = Self::default();
        for text in texts {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            registry.exact.insert(trimmed.to_string());
            // first spelling wins when two texts differ only by case
            registry
                .folded
                .entry(trimmed.to_lowercase())
                .or_insert_with(|| trimmed.to_string());
        }
        registry
    }

    pub fn check(&self, asserted: &str) -> TextMatch {
        let asserted = asserted.trim();
        if self.exact.contains(asserted) {
            return TextMatch::Exact;
        }
        match self.folded.get(&asserted.to_lowercase()) {
            Some(known) => TextMatch::CaseInsensitive(known.clone()),
            None => TextMatch::Missing,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.exact.is_empty()
    }

    pub fn len(&self) -> usize {
        self.exact.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_exact_case_and_missing() {
        let texts = vec!["Sign In".to_string(), "Loan Calculator".to_string()];
        let registry = TextRegistry::new(&texts);

        assert_eq!(registry.check("Sign In"), TextMatch::Exact);
        assert_eq!(
            registry.check("sign in"),
            TextMatch::CaseInsensitive("Sign In".to_string())
        );
        assert_eq!(registry.check("Totally Fake Button"), TextMatch::Missing);
    }

    #[test]
    fn first_spelling_wins() {
        let texts = vec!["Sign In".to_string(), "SIGN IN".to_string()];
        let registry = TextRegistry::new(&texts);
        assert_eq!(
            registry.check("sign in"),
            TextMatch::CaseInsensitive("Sign In".to_string())
        );
        assert_eq!(registry.check("SIGN IN"), TextMatch::Exact);
        assert_eq!(registry.len(), 2);
    }
}
