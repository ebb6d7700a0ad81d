use serde::Serialize;

use spec_compiler::{CompiledScenario, DropReason, DroppedScenario};
use specforge_core_types::{PageId, ScenarioId};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StepOutcome {
    Kept,
    CaseCorrected { from: String, to: String },
    DroppedUnknownText,
    RemovedNoFormFields,
}

impl StepOutcome {
    pub fn removes_step(&self) -> bool {
        matches!(
            self,
            StepOutcome::DroppedUnknownText | StepOutcome::RemovedNoFormFields
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Kept,
    Deleted(DropReason),
}

/// A step the validator touched
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StepReport {
    /// Position in the compiled scenario before repair
    pub index: usize,
    pub rendered: String,
    pub outcome: StepOutcome,
}

#[derive(Clone, Debug, Serialize)]
pub struct ScenarioReport {
    pub id: ScenarioId,
    pub page: PageId,
    pub outcome: ScenarioOutcome,
    /// Only steps whose outcome is not `Kept`
    pub steps: Vec<StepReport>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub scenarios_in: usize,
    pub scenarios_kept: usize,
    pub scenarios_deleted: usize,
    pub steps_case_corrected: usize,
    pub steps_dropped_unknown_text: usize,
    pub steps_removed_no_form_fields: usize,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct ValidationReport {
    pub scenarios: Vec<CompiledScenario>,
    pub deleted: Vec<DroppedScenario>,
    pub reports: Vec<ScenarioReport>,
    pub summary: ValidationSummary,
}

impl ValidationReport {
    pub fn report_for(&self, id: &str) -> Option<&ScenarioReport> {
        self.reports.iter().find(|report| report.id.as_str() == id)
    }
}
