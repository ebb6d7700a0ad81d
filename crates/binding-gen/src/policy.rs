use serde::{Deserialize, Serialize};

/// Settings baked into the generated step-implementation module.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingPolicyView {
    pub base_url: String,
    pub wait_timeout_secs: u64,
    pub headless: bool,
}

impl Default for BindingPolicyView {
    fn default() -> Self {
        Self {
            base_url: "https://www.calculator.net".to_string(),
            wait_timeout_secs: 8,
            headless: false,
        }
    }
}
