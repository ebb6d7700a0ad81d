use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationPolicyView {
    /// Concept name the compiler uses for the site search box
    pub search_concept: String,
    /// Treat clicks on non-locator targets as link-text assertions
    pub check_click_texts: bool,
    /// Skip text checks for pages with an empty text registry
    pub lenient_without_registry: bool,
}

impl Default for ValidationPolicyView {
    fn default() -> Self {
        Self {
            search_concept: "search term".to_string(),
            check_click_texts: true,
            lenient_without_registry: true,
        }
    }
}
