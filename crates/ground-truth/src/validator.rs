use std::collections::HashMap;

use page_knowledge::{is_search_concept, KnowledgeBase, TextMatch, TextRegistry};
use spec_compiler::{CompiledScenario, CompiledStep, DropReason, DroppedScenario, StepOrigin};
use specforge_core_types::PageId;
use step_canon::{Check, Verb};
use tracing::{debug, info, warn};

use crate::model::{
    ScenarioOutcome, ScenarioReport, StepOutcome, StepReport, ValidationReport, ValidationSummary,
};
use crate::policy::ValidationPolicyView;

pub struct GroundTruthValidator<'a> {
    kb: &'a KnowledgeBase,
    policy: ValidationPolicyView,
}

impl<'a> GroundTruthValidator<'a> {
    pub fn new(kb: &'a KnowledgeBase, policy: ValidationPolicyView) -> Self {
        Self { kb, policy }
    }

    /// Validate the complete batch. Scenario order is preserved.
    pub fn validate(&self, scenarios: Vec<CompiledScenario>) -> ValidationReport {
        let mut registries: HashMap<PageId, TextRegistry> = HashMap::new();
        let mut report = ValidationReport {
            summary: ValidationSummary {
                scenarios_in: scenarios.len(),
                ..Default::default()
            },
            ..Default::default()
        };

        for scenario in scenarios {
            let registry = registries
                .entry(scenario.page.clone())
                .or_insert_with(|| self.kb.text_registry(&scenario.page));
            let (kept, scenario_report) = self.validate_scenario(scenario, registry);

            for step in &scenario_report.steps {
                match step.outcome {
                    StepOutcome::CaseCorrected { .. } => report.summary.steps_case_corrected += 1,
                    StepOutcome::DroppedUnknownText => {
                        report.summary.steps_dropped_unknown_text += 1
                    }
                    StepOutcome::RemovedNoFormFields => {
                        report.summary.steps_removed_no_form_fields += 1
                    }
                    StepOutcome::Kept => {}
                }
            }
            match kept {
                Ok(scenario) => report.scenarios.push(scenario),
                Err(dropped) => report.deleted.push(dropped),
            }
            report.reports.push(scenario_report);
        }

        report.summary.scenarios_kept = report.scenarios.len();
        report.summary.scenarios_deleted = report.deleted.len();
        info!(
            kept = report.summary.scenarios_kept,
            deleted = report.summary.scenarios_deleted,
            corrected = report.summary.steps_case_corrected,
            dropped_text = report.summary.steps_dropped_unknown_text,
            removed_search = report.summary.steps_removed_no_form_fields,
            "validated batch against ground truth"
        );
        report
    }

    pub fn validate_scenario(
        &self,
        mut scenario: CompiledScenario,
        registry: &TextRegistry,
    ) -> (Result<CompiledScenario, DroppedScenario>, ScenarioReport) {
        let mut touched = Vec::new();
        let mut repaired = Vec::with_capacity(scenario.steps.len());

        for (index, mut compiled) in std::mem::take(&mut scenario.steps).into_iter().enumerate() {
            let rendered = compiled.render();
            let outcome = self.check_step(&scenario.page, &mut compiled, registry);
            match &outcome {
                StepOutcome::Kept => {}
                StepOutcome::CaseCorrected { from, to } => {
                    debug!(scenario = %scenario.id, %from, %to, "corrected display text case");
                }
                StepOutcome::DroppedUnknownText | StepOutcome::RemovedNoFormFields => {
                    warn!(scenario = %scenario.id, step = %rendered, ?outcome, "removed step");
                }
            }
            let removed = outcome.removes_step();
            if outcome != StepOutcome::Kept {
                touched.push(StepReport {
                    index,
                    rendered,
                    outcome,
                });
            }
            if !removed {
                repaired.push(compiled);
            }
        }
        repaired.dedup_by(|next, prev| next.step == prev.step);
        scenario.steps = repaired;

        let degenerate = scenario.had_form_entry
            && !scenario
                .steps
                .iter()
                .any(|s| s.origin == StepOrigin::Authored && !s.step.verb.is_navigation());

        let report = ScenarioReport {
            id: scenario.id.clone(),
            page: scenario.page.clone(),
            outcome: if degenerate {
                ScenarioOutcome::Deleted(DropReason::Degenerate)
            } else {
                ScenarioOutcome::Kept
            },
            steps: touched,
        };

        if degenerate {
            warn!(scenario = %scenario.id, page = %scenario.page, "deleting degenerate scenario");
            let dropped = DroppedScenario {
                source_id: scenario.source_id,
                page: scenario.page,
                title: scenario.title,
                reason: DropReason::Degenerate,
            };
            return (Err(dropped), report);
        }
        (Ok(scenario), report)
    }

    fn check_step(
        &self,
        page: &PageId,
        compiled: &mut CompiledStep,
        registry: &TextRegistry,
    ) -> StepOutcome {
        let verb = compiled.step.verb;
        match verb {
            Verb::Enter | Verb::Clear => {
                let into_search = self.kb.site().is_search_locator(&compiled.step.target);
                let searching = compiled
                    .concept
                    .as_deref()
                    .is_some_and(|c| is_search_concept(c, &self.policy.search_concept));
                if into_search && !searching && !self.kb.has_form_fields(page) {
                    return StepOutcome::RemovedNoFormFields;
                }
                StepOutcome::Kept
            }
            Verb::Verify(Check::PageContains) => self.check_text(compiled, registry),
            Verb::Click
                if self.policy.check_click_texts
                    && !self.kb.is_known_locator(page, &compiled.step.target) =>
            {
                self.check_text(compiled, registry)
            }
            _ => StepOutcome::Kept,
        }
    }

    fn check_text(&self, compiled: &mut CompiledStep, registry: &TextRegistry) -> StepOutcome {
        if registry.is_empty() && self.policy.lenient_without_registry {
            return StepOutcome::Kept;
        }
        match registry.check(&compiled.step.target) {
            TextMatch::Exact => StepOutcome::Kept,
            TextMatch::CaseInsensitive(known) => {
                let from = std::mem::replace(&mut compiled.step.target, known.clone());
                StepOutcome::CaseCorrected { from, to: known }
            }
            TextMatch::Missing => StepOutcome::DroppedUnknownText,
        }
    }
}
