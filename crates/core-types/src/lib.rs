use std::fmt;

use thiserror::Error;

/// Shared error type the component crates convert into.
#[derive(Debug, Error, Clone)]
pub enum ForgeError {
    #[error("{message}")]
    Message { message: String },
}

impl ForgeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

/// Page identifier: the URL path of a crawled page (`/loan-calculator.html`).
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct PageId(pub String);

impl PageId {
    /// Normalize a URL or path into a page id.
    ///
    /// `https://host/a.html?x=1` and `a.html` both become `/a.html`; an empty
    /// path becomes `/`.
    pub fn from_url(raw: &str) -> Self {
        let trimmed = raw.trim().trim_matches(|c| c == '"' || c == '\'');
        let without_scheme = match trimmed.find("://") {
            Some(idx) => {
                let rest = &trimmed[idx + 3..];
                match rest.find('/') {
                    Some(slash) => &rest[slash..],
                    None => "",
                }
            }
            None => trimmed,
        };
        let path = without_scheme
            .split(|c| c == '?' || c == '#')
            .next()
            .unwrap_or("")
            .trim();
        if path.is_empty() {
            Self("/".to_string())
        } else if path.starts_with('/') {
            Self(path.to_string())
        } else {
            Self(format!("/{path}"))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scenario identifier as emitted in the specification header.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScenarioId(pub String);

impl ScenarioId {
    /// Positional id used when the upstream scenario carries none.
    pub fn positional(index: usize) -> Self {
        Self(format!("TC_{:03}", index + 1))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Scenario category.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum Category {
    #[default]
    HappyPath,
    Negative,
    Boundary,
    EndToEnd,
}

impl Category {
    /// Parse an upstream category label; unknown labels yield `None`.
    pub fn parse(label: &str) -> Option<Self> {
        let normalized = label.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "happy_path" | "happy" | "positive" | "functional" => Some(Category::HappyPath),
            "negative" | "invalid" => Some(Category::Negative),
            "boundary" | "edge" | "edge_case" => Some(Category::Boundary),
            "end_to_end" | "e2e" => Some(Category::EndToEnd),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::HappyPath => "happy_path",
            Category::Negative => "negative",
            Category::Boundary => "boundary",
            Category::EndToEnd => "end_to_end",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_id_normalizes_urls() {
        assert_eq!(
            PageId::from_url("https://www.calculator.net/loan-calculator.html?x=1").0,
            "/loan-calculator.html"
        );
        assert_eq!(PageId::from_url("https://www.calculator.net").0, "/");
        assert_eq!(PageId::from_url("'mortgage-calculator.html'").0, "/mortgage-calculator.html");
        assert_eq!(PageId::from_url("/").0, "/");
    }

    #[test]
    fn category_labels() {
        assert_eq!(Category::parse("e2e"), Some(Category::EndToEnd));
        assert_eq!(Category::parse("Happy Path"), Some(Category::HappyPath));
        assert_eq!(Category::parse("exploratory"), None);
        assert_eq!(Category::default(), Category::HappyPath);
    }
}
