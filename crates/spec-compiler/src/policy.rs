use serde::{Deserialize, Serialize};

use oracle_calc::OraclePolicyView;
use step_canon::CanonPolicyView;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilePolicyView {
    /// Entered values that mark a scenario as feeding invalid input
    pub invalid_markers: Vec<String>,
    /// Compile pages on the rayon pool
    pub parallel: bool,
    /// Synthesize `c<concept>` locators for unknown concepts; when off the
    /// step is discarded instead
    pub fallback_locators: bool,
    /// Add a click on the site search action after a search entry
    pub derive_search_click: bool,
    pub canon: CanonPolicyView,
    pub oracle: OraclePolicyView,
}

impl Default for CompilePolicyView {
    fn default() -> Self {
        Self {
            invalid_markers: ["abc", "xyz", "invalid", "!@#", "!@#$", "nan", "null", "undefined"]
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
            parallel: true,
            fallback_locators: true,
            derive_search_click: true,
            canon: CanonPolicyView::default(),
            oracle: OraclePolicyView::default(),
        }
    }
}

impl CompilePolicyView {
    pub fn is_invalid_marker(&self, value: &str) -> bool {
        let value = value.trim().to_lowercase();
        self.invalid_markers
            .iter()
            .any(|marker| marker.trim().to_lowercase() == value)
    }
}
