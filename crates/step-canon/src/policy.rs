use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CanonPolicyView {
    /// Concept name used for the site-wide search box
    pub search_concept: String,
    /// Literals longer than this are truncated on a char boundary
    pub max_literal_len: usize,
}

impl Default for CanonPolicyView {
    fn default() -> Self {
        Self {
            search_concept: "search term".to_string(),
            max_literal_len: 200,
        }
    }
}
