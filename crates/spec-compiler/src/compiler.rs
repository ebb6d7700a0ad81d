//! Scenario and batch compilation

use rayon::prelude::*;
use tracing::{debug, info, warn};

use oracle_calc::Oracle;
use page_knowledge::KnowledgeBase;
use specforge_core_types::{PageId, ScenarioId};
use step_canon::{CanonOutcome, CanonicalStep, Canonicalizer, Verb};

use crate::classify::classify;
use crate::ids::{qualified_id, ScenarioIdAllocator};
use crate::input::{PageIntents, ScenarioDocument, ScenarioIntent};
use crate::model::{
    CompileSummary, CompiledBatch, CompiledScenario, CompiledStep, DropReason, DroppedScenario,
    Resolution, ScenarioCompilation, StepTrace,
};
use crate::policy::CompilePolicyView;
use crate::resolve::StepResolver;
use crate::verify::{derive_verifications, EnteredValue, VerificationContext};

#[derive(Clone, Debug, Default)]
pub struct SpecCompiler {
    policy: CompilePolicyView,
    canon: Canonicalizer,
    oracle: Oracle,
}

impl SpecCompiler {
    pub fn new(policy: CompilePolicyView) -> Self {
        Self {
            canon: Canonicalizer::new(policy.canon.clone()),
            oracle: Oracle::new(policy.oracle.clone()),
            policy,
        }
    }

    pub fn policy(&self) -> &CompilePolicyView {
        &self.policy
    }

    /// Compile one intent against its page. `position` is the intent's index
    /// within its page entry and only names intents without an id.
    pub fn compile(
        &self,
        intent: &ScenarioIntent,
        position: usize,
        entry_page: &PageId,
        module: Option<&str>,
        kb: &KnowledgeBase,
    ) -> ScenarioCompilation {
        let source_id = intent
            .scenario_id
            .clone()
            .map(ScenarioId)
            .unwrap_or_else(|| ScenarioId::positional(position));
        let title = intent
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or("Untitled")
            .to_string();
        let page = intent
            .page
            .as_deref()
            .map(PageId::from_url)
            .unwrap_or_else(|| entry_page.clone());
        let tags = normalize_tags(&intent.tags);
        let category = classify(intent.category.as_deref(), &title, source_id.as_str(), &tags);
        let resolver = StepResolver::new(kb, &page, &self.policy);

        let mut steps = Vec::with_capacity(intent.steps.len() + 4);
        let mut traces = Vec::with_capacity(intent.steps.len());
        let mut entries = Vec::new();
        let mut had_form_entry = false;

        for (index, raw) in intent.steps.iter().enumerate() {
            let step = match self.canon.canonicalize(raw) {
                CanonOutcome::Canonicalized(step) => step,
                CanonOutcome::Discarded(reason) => {
                    debug!(scenario = %source_id, index, %reason, "discarded step");
                    traces.push(StepTrace {
                        index,
                        rendered: None,
                        resolution: Resolution::Discarded { reason },
                    });
                    continue;
                }
            };
            had_form_entry |= step.verb.is_form_entry();

            let resolved = resolver.resolve(step);
            let Some(step) = resolved.step else {
                traces.push(StepTrace {
                    index,
                    rendered: None,
                    resolution: resolved.resolution,
                });
                continue;
            };
            if let (Verb::Enter | Verb::Select, Some(value)) = (step.verb, step.value()) {
                entries.push(EnteredValue {
                    verb: step.verb,
                    concept: resolved.concept.clone().unwrap_or_else(|| step.target.clone()),
                    locator: step.target.clone(),
                    value: value.to_string(),
                });
            }
            traces.push(StepTrace {
                index,
                rendered: Some(step.render()),
                resolution: resolved.resolution,
            });
            steps.push(CompiledStep::authored(step).with_concept(resolved.concept));
        }

        if self.policy.derive_search_click {
            add_search_clicks(&mut steps, kb);
        }
        ensure_navigation(&mut steps, &page);

        let mut scenario = CompiledScenario {
            id: ScenarioId(qualified_id(module, &source_id)),
            source_id,
            page: page.clone(),
            module: module.map(str::to_string),
            title,
            category,
            tags,
            steps,
            traces,
            oracle: None,
            had_form_entry,
        };

        if scenario.is_navigation_only() {
            warn!(
                scenario = %scenario.source_id,
                page = %scenario.page,
                "dropping scenario with nothing beyond navigation"
            );
            return ScenarioCompilation::Dropped(DroppedScenario {
                source_id: scenario.source_id,
                page: scenario.page,
                title: scenario.title,
                reason: DropReason::Degenerate,
            });
        }

        let primary = resolver.profile().and_then(|p| p.primary_action.as_deref());
        let ctx = VerificationContext {
            kind: resolver.page_kind(),
            primary_action: primary,
            category,
            policy: &self.policy,
            oracle: &self.oracle,
        };
        scenario.oracle = derive_verifications(&mut scenario.steps, &entries, &ctx);
        scenario.steps.dedup_by(|next, prev| next.step == prev.step);

        ScenarioCompilation::Compiled(Box::new(scenario))
    }

    pub fn compile_page(&self, page: &PageIntents, kb: &KnowledgeBase) -> Vec<ScenarioCompilation> {
        page.scenarios
            .iter()
            .enumerate()
            .map(|(position, intent)| {
                self.compile(intent, position, &page.page, page.module.as_deref(), kb)
            })
            .collect()
    }

    /// Compile every page, then allocate batch-unique ids in input order.
    pub fn compile_batch(&self, doc: &ScenarioDocument, kb: &KnowledgeBase) -> CompiledBatch {
        let per_page: Vec<Vec<ScenarioCompilation>> = if self.policy.parallel {
            doc.pages
                .par_iter()
                .map(|page| self.compile_page(page, kb))
                .collect()
        } else {
            doc.pages
                .iter()
                .map(|page| self.compile_page(page, kb))
                .collect()
        };

        let mut summary = CompileSummary {
            pages: doc.pages.len(),
            pages_skipped: doc.skipped_entries,
            scenarios_in: doc.scenario_count(),
            scenarios_skipped: doc.skipped_scenarios,
            ..Default::default()
        };

        let mut compiled = Vec::new();
        let mut dropped = Vec::new();
        for outcome in per_page.into_iter().flatten() {
            match outcome {
                ScenarioCompilation::Compiled(scenario) => compiled.push(*scenario),
                ScenarioCompilation::Dropped(scenario) => dropped.push(scenario),
            }
        }

        let mut ids = ScenarioIdAllocator::new(compiled.iter().map(|s| s.id.as_str()));
        for scenario in compiled.iter_mut() {
            let (id, suffixed) = ids.allocate(scenario.id.as_str());
            if suffixed {
                debug!(from = %scenario.id, to = %id, "disambiguated duplicate scenario id");
                summary.ids_suffixed += 1;
            }
            scenario.id = id;
        }

        for scenario in &compiled {
            summary.steps_discarded += scenario
                .traces
                .iter()
                .filter(|t| t.resolution.is_discarded())
                .count();
            summary.fallback_locators += scenario
                .traces
                .iter()
                .filter(|t| t.resolution.is_fallback())
                .count();
            if scenario.oracle.as_ref().is_some_and(|o| o.is_available()) {
                summary.oracles_computed += 1;
            }
        }
        summary.compiled = compiled.len();
        summary.dropped_degenerate = dropped.len();

        info!(
            pages = summary.pages,
            compiled = summary.compiled,
            dropped = summary.dropped_degenerate,
            fallbacks = summary.fallback_locators,
            oracles = summary.oracles_computed,
            "compiled scenario batch"
        );

        CompiledBatch {
            scenarios: compiled,
            dropped,
            summary,
        }
    }
}

fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().replace('-', "_");
        if !tag.is_empty() && !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// A search entry not followed by a click gets a click on the search action.
fn add_search_clicks(steps: &mut Vec<CompiledStep>, kb: &KnowledgeBase) {
    let site = kb.site();
    let Some(action) = site.search_action.as_deref() else {
        return;
    };
    let mut index = 0;
    while index < steps.len() {
        let step = &steps[index].step;
        let is_search_entry = step.verb == Verb::Enter && site.is_search_locator(&step.target);
        let followed_by_click = steps
            .get(index + 1)
            .is_some_and(|next| next.step.verb == Verb::Click);
        if is_search_entry && !followed_by_click {
            steps.insert(index + 1, CompiledStep::derived(CanonicalStep::click(action)));
            index += 1;
        }
        index += 1;
    }
}

/// First step must navigate to the scenario's own page.
fn ensure_navigation(steps: &mut Vec<CompiledStep>, page: &PageId) {
    let own = steps.first().is_some_and(|first| {
        first.step.verb == Verb::Navigate && PageId::from_url(&first.step.target) == *page
    });
    if own {
        if let Some(first) = steps.first_mut() {
            first.step.target = page.as_str().to_string();
        }
    } else {
        steps.insert(0, CompiledStep::derived(CanonicalStep::navigate(page.as_str())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use step_canon::RawStep;

    fn intent(id: &str, title: &str, steps: &[&str]) -> ScenarioIntent {
        ScenarioIntent {
            scenario_id: Some(id.to_string()),
            title: Some(title.to_string()),
            steps: steps.iter().map(|s| RawStep::text(*s)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn prepends_navigation_and_drops_nav_only() {
        let compiler = SpecCompiler::default();
        let kb = KnowledgeBase::empty();
        let page = PageId::from_url("/about-us.html");

        let kept = compiler.compile(&intent("TC_1", "About", &["Click \"Contact\""]), 0, &page, None, &kb);
        let ScenarioCompilation::Compiled(scenario) = kept else {
            panic!("expected compiled scenario");
        };
        assert!(scenario.starts_with_own_navigation());
        assert_eq!(
            scenario.rendered_steps().collect::<Vec<_>>(),
            vec![
                "Navigate to \"/about-us.html\"".to_string(),
                "Click \"Contact\"".to_string(),
                "Verify that \"page loaded successfully\"".to_string(),
            ]
        );

        let nav_only = compiler.compile(
            &intent("TC_2", "Just open", &["Navigate to /about-us.html", "Wiggle the mouse"]),
            1,
            &page,
            None,
            &kb,
        );
        assert!(matches!(nav_only, ScenarioCompilation::Dropped(_)));
    }

    #[test]
    fn consecutive_duplicates_are_stripped() {
        let compiler = SpecCompiler::default();
        let kb = KnowledgeBase::empty();
        let page = PageId::from_url("/about-us.html");
        let compiled = compiler.compile(
            &intent("TC_1", "Dup", &["Click Contact", "Click \"Contact\"", "Click Contact"]),
            0,
            &page,
            None,
            &kb,
        );
        let ScenarioCompilation::Compiled(scenario) = compiled else {
            panic!("expected compiled scenario");
        };
        assert_eq!(scenario.steps.len(), 3);
    }

    #[test]
    fn search_entry_gets_derived_click() {
        let kb = KnowledgeBase::from_json_str(
            r#"{"site": {"search_locator": "calcSearchTerm", "search_action": "Search"},
                "pages": {"/": {"fields": {"search term": "calcSearchTerm"}}}}"#,
        )
        .unwrap();
        let compiler = SpecCompiler::default();
        let compiled = compiler.compile(
            &intent("TC_1", "Search loan", &["Enter search term loan"]),
            0,
            &PageId::from_url("/"),
            Some("HOME"),
            &kb,
        );
        let ScenarioCompilation::Compiled(scenario) = compiled else {
            panic!("expected compiled scenario");
        };
        assert_eq!(scenario.id.as_str(), "HOME_TC_1");
        assert_eq!(
            scenario.rendered_steps().collect::<Vec<_>>(),
            vec![
                "Navigate to \"/\"".to_string(),
                "Enter \"loan\" into \"calcSearchTerm\"".to_string(),
                "Click \"Search\"".to_string(),
                "Verify that \"search did not crash\"".to_string(),
            ]
        );
    }

    #[test]
    fn tags_are_normalized() {
        assert_eq!(
            normalize_tags(&[" smoke ".into(), "search-flow".into(), "smoke".into(), "".into()]),
            vec!["smoke".to_string(), "search_flow".to_string()]
        );
    }
}
