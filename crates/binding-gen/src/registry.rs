use std::collections::BTreeSet;

use spec_compiler::verify::{
    FORM_VISIBLE, LOGIN_ATTEMPTED, PAGE_LOADED, RESULT_DISPLAYED, SEARCH_NO_CRASH, USER_LOGGED_IN,
};
use step_canon::{CanonicalStep, Check, Verb};

use crate::bodies;
use crate::template::{Slot, StepTemplate};

/// Literal constraint of a pinned slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pin {
    Exact(String),
    OneOf(BTreeSet<String>),
}

impl Pin {
    pub fn admits(&self, literal: &str) -> bool {
        match self {
            Pin::Exact(expected) => expected == literal,
            Pin::OneOf(choices) => choices.contains(literal),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SlotSpec {
    Hole(String),
    /// `bind` names a local the body reads the pinned literal from
    Pin { pin: Pin, bind: Option<String> },
}

impl SlotSpec {
    pub fn hole(name: &str) -> Self {
        SlotSpec::Hole(name.to_string())
    }

    pub fn exact(literal: &str) -> Self {
        SlotSpec::Pin {
            pin: Pin::Exact(literal.to_string()),
            bind: None,
        }
    }
}

/// A registry entry: which steps it accepts and how to implement them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepPattern {
    pub name: String,
    pub verb: Verb,
    pub slots: Vec<SlotSpec>,
    pub body: String,
}

impl StepPattern {
    pub fn new(name: &str, verb: Verb, slots: Vec<SlotSpec>, body: &str) -> Self {
        Self {
            name: name.to_string(),
            verb,
            slots,
            body: body.to_string(),
        }
    }

    /// Template of `step` when this pattern accepts it.
    pub fn template_for(&self, step: &CanonicalStep) -> Option<StepTemplate> {
        if step.verb != self.verb {
            return None;
        }
        let literals = step.literals();
        if literals.len() != self.slots.len() {
            return None;
        }
        let mut slots = Vec::with_capacity(literals.len());
        for (spec, literal) in self.slots.iter().zip(literals) {
            match spec {
                SlotSpec::Hole(name) => slots.push(Slot::Hole { name: name.clone() }),
                SlotSpec::Pin { pin, .. } if pin.admits(literal) => slots.push(Slot::Pinned {
                    literal: literal.to_string(),
                }),
                SlotSpec::Pin { .. } => return None,
            }
        }
        Some(StepTemplate::from_step(step, slots))
    }

    /// Body with bound pinned literals assigned first.
    pub fn body_for(&self, template: &StepTemplate) -> String {
        let mut body = String::new();
        for (spec, slot) in self.slots.iter().zip(template.slots()) {
            if let (SlotSpec::Pin { bind: Some(local), .. }, Slot::Pinned { literal }) = (spec, slot)
            {
                body.push_str(&format!("{local} = {}\n", crate::render::py_str(literal)));
            }
        }
        body.push_str(&self.body);
        body
    }
}

/// Ordered pattern list; the first pattern that accepts a step wins.
#[derive(Clone, Debug, Default)]
pub struct PatternRegistry {
    patterns: Vec<StepPattern>,
}

impl PatternRegistry {
    pub fn new(patterns: Vec<StepPattern>) -> Self {
        Self { patterns }
    }

    /// The standard Gauge/Selenium registry. `dropdowns` are the locators the
    /// knowledge base knows to be `<select>` elements.
    pub fn standard(dropdowns: BTreeSet<String>) -> Self {
        use SlotSpec as S;
        let fixed = |name: &str, condition: &str, body: &str| {
            StepPattern::new(
                name,
                Verb::Verify(Check::Condition),
                vec![S::exact(condition)],
                body,
            )
        };

        Self::new(vec![
            StepPattern::new(
                "navigate_back_to",
                Verb::NavigateBack,
                vec![S::hole("path")],
                bodies::NAVIGATE_BACK,
            ),
            StepPattern::new(
                "navigate_to",
                Verb::Navigate,
                vec![S::hole("path")],
                bodies::NAVIGATE,
            ),
            StepPattern::new(
                "enter_into_dropdown",
                Verb::Enter,
                vec![
                    S::hole("value"),
                    S::Pin {
                        pin: Pin::OneOf(dropdowns),
                        bind: Some("element_id".to_string()),
                    },
                ],
                bodies::ENTER_DROPDOWN,
            ),
            StepPattern::new(
                "enter_into",
                Verb::Enter,
                vec![S::hole("value"), S::hole("element_id")],
                bodies::ENTER,
            ),
            StepPattern::new(
                "clear_field",
                Verb::Clear,
                vec![S::hole("element_id")],
                bodies::CLEAR,
            ),
            StepPattern::new(
                "select_in",
                Verb::Select,
                vec![S::hole("value"), S::hole("element_id")],
                bodies::SELECT,
            ),
            StepPattern::new(
                "click_element",
                Verb::Click,
                vec![S::hole("element_id")],
                bodies::CLICK,
            ),
            StepPattern::new(
                "verify_page_contains",
                Verb::Verify(Check::PageContains),
                vec![S::hole("text")],
                bodies::PAGE_CONTAINS,
            ),
            StepPattern::new(
                "verify_result_contains",
                Verb::Verify(Check::ResultContains),
                vec![S::hole("expected")],
                bodies::RESULT_CONTAINS,
            ),
            StepPattern::new(
                "verify_no_valid_result",
                Verb::Verify(Check::NoValidResult),
                vec![S::hole("value")],
                bodies::NO_VALID_RESULT,
            ),
            StepPattern::new(
                "verify_field_value",
                Verb::Verify(Check::FieldValue),
                vec![S::hole("expected"), S::hole("element_id")],
                bodies::FIELD_VALUE,
            ),
            fixed("verify_page_loaded", PAGE_LOADED, bodies::PAGE_LOADED),
            fixed(
                "verify_result_displayed",
                RESULT_DISPLAYED,
                bodies::RESULT_DISPLAYED,
            ),
            fixed("verify_user_logged_in", USER_LOGGED_IN, bodies::USER_LOGGED_IN),
            fixed(
                "verify_login_attempted",
                LOGIN_ATTEMPTED,
                bodies::LOGIN_ATTEMPTED,
            ),
            fixed(
                "verify_search_no_crash",
                SEARCH_NO_CRASH,
                bodies::SEARCH_NO_CRASH,
            ),
            fixed("verify_form_visible", FORM_VISIBLE, bodies::FORM_VISIBLE),
            StepPattern::new(
                "verify_condition",
                Verb::Verify(Check::Condition),
                vec![S::hole("condition")],
                bodies::CONDITION,
            ),
        ])
    }

    pub fn patterns(&self) -> &[StepPattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn match_step(&self, step: &CanonicalStep) -> Option<(&StepPattern, StepTemplate)> {
        self.patterns
            .iter()
            .find_map(|pattern| pattern.template_for(step).map(|t| (pattern, t)))
    }
}
