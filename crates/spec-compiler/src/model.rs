use serde::Serialize;

use oracle_calc::OracleOutcome;
use specforge_core_types::{Category, PageId, ScenarioId};
use step_canon::{CanonicalStep, DiscardReason};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOrigin {
    /// Came from the scenario intent
    Authored,
    /// Added by the compiler (navigation, clicks, verifications)
    Derived,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CompiledStep {
    pub step: CanonicalStep,
    pub origin: StepOrigin,
    /// Concept the step was authored against, before resolution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concept: Option<String>,
}

impl CompiledStep {
    pub fn authored(step: CanonicalStep) -> Self {
        Self {
            step,
            origin: StepOrigin::Authored,
            concept: None,
        }
    }

    pub fn derived(step: CanonicalStep) -> Self {
        Self {
            step,
            origin: StepOrigin::Derived,
            concept: None,
        }
    }

    pub fn with_concept(mut self, concept: Option<String>) -> Self {
        self.concept = concept;
        self
    }

    pub fn render(&self) -> String {
        self.step.render()
    }
}

/// What happened to one authored step
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum Resolution {
    Resolved { concept: String, locator: String },
    Fallback { concept: String, locator: String },
    Passthrough,
    Discarded { reason: DiscardReason },
}

impl Resolution {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback { .. })
    }

    pub fn is_discarded(&self) -> bool {
        matches!(self, Resolution::Discarded { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepTrace {
    /// Position in the authored step list
    pub index: usize,
    pub rendered: Option<String>,
    pub resolution: Resolution,
}

#[derive(Clone, Debug, Serialize)]
pub struct CompiledScenario {
    /// Batch-unique qualified id
    pub id: ScenarioId,
    pub source_id: ScenarioId,
    pub page: PageId,
    pub module: Option<String>,
    pub title: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub steps: Vec<CompiledStep>,
    pub traces: Vec<StepTrace>,
    pub oracle: Option<OracleOutcome>,
    /// Authored enter/clear/select steps survived canonicalization
    pub had_form_entry: bool,
}

impl CompiledScenario {
    pub fn rendered_steps(&self) -> impl Iterator<Item = String> + '_ {
        self.steps.iter().map(CompiledStep::render)
    }

    /// True when nothing but navigation was authored.
    pub fn is_navigation_only(&self) -> bool {
        !self
            .steps
            .iter()
            .any(|s| s.origin == StepOrigin::Authored && !s.step.verb.is_navigation())
    }

    pub fn starts_with_own_navigation(&self) -> bool {
        self.steps.first().is_some_and(|first| {
            first.step.verb == step_canon::Verb::Navigate && first.step.target == self.page.as_str()
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Only navigation survived compilation or repair
    Degenerate,
}

#[derive(Clone, Debug, Serialize)]
pub struct DroppedScenario {
    pub source_id: ScenarioId,
    pub page: PageId,
    pub title: String,
    pub reason: DropReason,
}

/// Result of compiling one intent, before batch id allocation
#[derive(Clone, Debug)]
pub enum ScenarioCompilation {
    Compiled(Box<CompiledScenario>),
    Dropped(DroppedScenario),
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CompileSummary {
    pub pages: usize,
    pub pages_skipped: usize,
    pub scenarios_in: usize,
    pub scenarios_skipped: usize,
    pub compiled: usize,
    pub dropped_degenerate: usize,
    pub steps_discarded: usize,
    pub fallback_locators: usize,
    pub oracles_computed: usize,
    pub ids_suffixed: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct CompiledBatch {
    pub scenarios: Vec<CompiledScenario>,
    pub dropped: Vec<DroppedScenario>,
    pub summary: CompileSummary,
}
