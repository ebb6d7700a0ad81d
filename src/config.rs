//! Run configuration.
//!
//! Loaded from YAML; every field has a default so partial files are fine.
//! Component crates get their own policy views out of it.

use std::env;
use std::path::PathBuf;

use binding_gen::BindingPolicyView;
use ground_truth::ValidationPolicyView;
use serde::{Deserialize, Serialize};
use spec_compiler::CompilePolicyView;
use tracing::info;

pub const ENV_OUTPUT_DIR: &str = "SPECFORGE_OUTPUT_DIR";
pub const ENV_SUITE_TITLE: &str = "SPECFORGE_SUITE_TITLE";
pub const ENV_BASE_URL: &str = "SPECFORGE_BASE_URL";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub suite_title: String,
    pub output_dir: PathBuf,
    pub artifacts: ArtifactNames,
    pub compile: CompilePolicyView,
    pub validation: ValidationPolicyView,
    pub bindings: BindingPolicyView,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            suite_title: "Generated Test Suite".to_string(),
            output_dir: PathBuf::from("./specforge-output"),
            artifacts: ArtifactNames::default(),
            compile: CompilePolicyView::default(),
            validation: ValidationPolicyView::default(),
            bindings: BindingPolicyView::default(),
        }
    }
}

/// File names of the artifact pair inside the output directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactNames {
    pub spec_file: String,
    pub bindings_file: String,
}

impl Default for ArtifactNames {
    fn default() -> Self {
        Self {
            spec_file: "generated.spec".to_string(),
            bindings_file: "step_impl.py".to_string(),
        }
    }
}

impl Config {
    /// Validation must agree with the canonicalizer on the search concept.
    pub fn validation_policy(&self) -> ValidationPolicyView {
        ValidationPolicyView {
            search_concept: self.compile.canon.search_concept.clone(),
            ..self.validation.clone()
        }
    }

    pub fn apply_env_overrides(&mut self) {
        if let Some(dir) = non_empty_env(ENV_OUTPUT_DIR) {
            info!(output_dir = %dir, "output dir from environment");
            self.output_dir = PathBuf::from(dir);
        }
        if let Some(title) = non_empty_env(ENV_SUITE_TITLE) {
            self.suite_title = title;
        }
        if let Some(url) = non_empty_env(ENV_BASE_URL) {
            info!(base_url = %url, "base url from environment");
            self.bindings.base_url = url;
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
