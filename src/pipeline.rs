//! End-to-end compilation: scenario document in, artifact pair out.

use std::path::Path;

use binding_gen::{render_bindings, render_spec, BindingGenerator, BindingSet, PatternRegistry};
use ground_truth::{GroundTruthValidator, ValidationReport, ValidationSummary};
use page_knowledge::KnowledgeBase;
use serde::Serialize;
use spec_compiler::{CompileSummary, DroppedScenario, ScenarioDocument, SpecCompiler};
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::errors::{SpecForgeError, SpecForgeResult};

/// Load the crawled knowledge base; without a file every page is unknown.
pub async fn load_knowledge(path: Option<&Path>) -> SpecForgeResult<KnowledgeBase> {
    let Some(path) = path else {
        warn!("no knowledge base given; every locator will be a fallback");
        return Ok(KnowledgeBase::empty());
    };
    let raw = fs::read(path).await.map_err(|source| SpecForgeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let kb = KnowledgeBase::from_slice(&raw).map_err(|source| SpecForgeError::Knowledge {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), pages = kb.len(), "loaded knowledge base");
    Ok(kb)
}

pub async fn load_scenarios(path: &Path) -> SpecForgeResult<ScenarioDocument> {
    let raw = fs::read(path).await.map_err(|source| SpecForgeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = ScenarioDocument::from_slice(&raw).map_err(|source| SpecForgeError::Scenarios {
        path: path.to_path_buf(),
        source,
    })?;
    info!(
        path = %path.display(),
        pages = doc.pages.len(),
        scenarios = doc.scenario_count(),
        "loaded scenario document"
    );
    Ok(doc)
}

/// Counts reported after a run and recorded in the manifest.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub compile: CompileSummary,
    pub validation: ValidationSummary,
    pub scenarios_emitted: usize,
    pub templates: usize,
    pub stub_bindings: usize,
}

pub struct PipelineOutput {
    pub spec_text: String,
    pub bindings_text: String,
    pub bindings: BindingSet,
    pub validation: ValidationReport,
    /// Degenerate scenarios dropped by the compiler
    pub compile_dropped: Vec<DroppedScenario>,
    pub summary: RunSummary,
}

pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compile, validate, and render. Pure over its inputs.
    pub fn run(&self, doc: &ScenarioDocument, kb: &KnowledgeBase) -> PipelineOutput {
        let compiler = SpecCompiler::new(self.config.compile.clone());
        let batch = compiler.compile_batch(doc, kb);

        let validator = GroundTruthValidator::new(kb, self.config.validation_policy());
        let validation = validator.validate(batch.scenarios);

        let generator = BindingGenerator::new(PatternRegistry::standard(kb.all_dropdowns()));
        let bindings = generator.generate(&validation.scenarios);

        let spec_text = render_spec(&self.config.suite_title, &validation.scenarios);
        let bindings_text = render_bindings(&bindings, &self.config.bindings);

        let summary = RunSummary {
            compile: batch.summary,
            validation: validation.summary.clone(),
            scenarios_emitted: validation.scenarios.len(),
            templates: bindings.len(),
            stub_bindings: bindings.stub_count(),
        };
        info!(
            emitted = summary.scenarios_emitted,
            templates = summary.templates,
            stubs = summary.stub_bindings,
            "pipeline finished"
        );

        PipelineOutput {
            spec_text,
            bindings_text,
            bindings,
            validation,
            compile_dropped: batch.dropped,
            summary,
        }
    }
}
