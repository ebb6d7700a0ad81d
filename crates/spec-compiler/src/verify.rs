//! Verification step derivation

use oracle_calc::{parse_number, Compounding, Oracle, OracleInputs, OracleOutcome, Unavailable};
use page_knowledge::{normalize_concept, PageKind};
use specforge_core_types::Category;
use step_canon::{CanonicalStep, Check, Verb};

use crate::model::CompiledStep;
use crate::policy::CompilePolicyView;

pub const PAGE_LOADED: &str = "page loaded successfully";
pub const RESULT_DISPLAYED: &str = "result is displayed";
pub const USER_LOGGED_IN: &str = "user is logged in";
pub const LOGIN_ATTEMPTED: &str = "login was attempted";
pub const SEARCH_NO_CRASH: &str = "search did not crash";
pub const FORM_VISIBLE: &str = "form is visible";

const PRINCIPAL: &[&str] = &[
    "loan amount",
    "principal",
    "principle",
    "house price",
    "sale price",
    "starting principal",
];
const RATE: &[&str] = &["interest rate", "rate"];
const TERM: &[&str] = &["loan term", "term", "years"];

/// A value entered or selected by an authored step
#[derive(Clone, Debug)]
pub struct EnteredValue {
    pub verb: Verb,
    pub concept: String,
    pub locator: String,
    pub value: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OracleRole {
    Principal,
    Rate,
    Term,
}

fn mentions(concept: &str, locator: &str, phrases: &[&str]) -> bool {
    let concept = normalize_concept(concept);
    let locator = locator.to_lowercase();
    phrases.iter().any(|phrase| {
        concept.contains(phrase) || locator.contains(&phrase.replace(' ', ""))
    })
}

pub fn role_of(concept: &str, locator: &str) -> Option<OracleRole> {
    if mentions(concept, locator, PRINCIPAL) {
        Some(OracleRole::Principal)
    } else if mentions(concept, locator, RATE) {
        Some(OracleRole::Rate)
    } else if mentions(concept, locator, TERM) {
        Some(OracleRole::Term)
    } else {
        None
    }
}

/// First entered value per role; compounding from whatever fills a `compound` field.
pub fn gather_inputs(entries: &[EnteredValue]) -> OracleInputs {
    let mut inputs = OracleInputs::default();
    for entry in entries {
        let mentions_compound = entry.concept.to_lowercase().contains("compound")
            || entry.locator.to_lowercase().contains("compound");
        if mentions_compound {
            inputs.compounding = Compounding::from_label(&entry.value);
            continue;
        }
        if entry.verb != Verb::Enter {
            continue;
        }
        let slot = match role_of(&entry.concept, &entry.locator) {
            Some(OracleRole::Principal) => &mut inputs.principal,
            Some(OracleRole::Rate) => &mut inputs.rate,
            Some(OracleRole::Term) => &mut inputs.years,
            None => continue,
        };
        if slot.is_none() {
            *slot = Some(entry.value.clone());
        }
    }
    inputs
}

pub struct VerificationContext<'a> {
    pub kind: PageKind,
    pub primary_action: Option<&'a str>,
    pub category: Category,
    pub policy: &'a CompilePolicyView,
    pub oracle: &'a Oracle,
}

fn is_negative_number(value: &str) -> bool {
    matches!(parse_number(value), Err(Unavailable::Negative(_)))
}

fn push_derived(steps: &mut Vec<CompiledStep>, step: CanonicalStep) {
    steps.push(CompiledStep::derived(step));
}

/// Insert a primary-action click after the last form entry unless one
/// already follows it.
fn ensure_primary_click(steps: &mut Vec<CompiledStep>, primary: Option<&str>) {
    let Some(primary) = primary else {
        return;
    };
    let Some(last_entry) = steps.iter().rposition(|s| s.step.verb.is_form_entry()) else {
        return;
    };
    let clicked = steps[last_entry + 1..]
        .iter()
        .any(|s| s.step.verb == Verb::Click && s.step.target == primary);
    if !clicked {
        steps.insert(last_entry + 1, CompiledStep::derived(CanonicalStep::click(primary)));
    }
}

/// Append verification steps; returns the oracle outcome when one was computed.
pub fn derive_verifications(
    steps: &mut Vec<CompiledStep>,
    entries: &[EnteredValue],
    ctx: &VerificationContext<'_>,
) -> Option<OracleOutcome> {
    let mut oracle = None;
    let typed: Vec<&EnteredValue> = entries.iter().filter(|e| e.verb == Verb::Enter).collect();
    let invalid = typed
        .iter()
        .find(|e| ctx.policy.is_invalid_marker(&e.value) || is_negative_number(&e.value));
    let has_numeric = typed.iter().any(|e| parse_number(&e.value).is_ok());

    if let Some(invalid) = invalid {
        if ctx.kind == PageKind::Calculator {
            ensure_primary_click(steps, ctx.primary_action);
        }
        push_derived(
            steps,
            CanonicalStep::verify(Check::NoValidResult, &invalid.value),
        );
    } else if ctx.kind == PageKind::Calculator && has_numeric && ctx.category != Category::Negative
    {
        ensure_primary_click(steps, ctx.primary_action);
        push_derived(steps, CanonicalStep::verify(Check::Condition, RESULT_DISPLAYED));
        let outcome = ctx.oracle.compute(&gather_inputs(entries));
        if let Some(amount) = outcome.amount() {
            push_derived(
                steps,
                CanonicalStep::verify(Check::ResultContains, &amount.formatted),
            );
        }
        oracle = Some(outcome);
    } else if ctx.kind == PageKind::Login {
        let condition = if ctx.category == Category::HappyPath {
            USER_LOGGED_IN
        } else {
            LOGIN_ATTEMPTED
        };
        push_derived(steps, CanonicalStep::verify(Check::Condition, condition));
    } else if ctx.kind == PageKind::Search {
        push_derived(steps, CanonicalStep::verify(Check::Condition, SEARCH_NO_CRASH));
    }

    if !steps.iter().any(|s| matches!(s.step.verb, Verb::Verify(_))) {
        push_derived(steps, CanonicalStep::verify(Check::Condition, PAGE_LOADED));
    }
    oracle
}
