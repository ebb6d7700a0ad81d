//! Canonical surface forms

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{CanonicalStep, Check, Verb};

const LIT: &str = r#""([^"]*)""#;

struct Form {
    verb: Verb,
    regex: Regex,
    has_value: bool,
}

fn form(verb: Verb, pattern: &str, has_value: bool) -> Form {
    let source = format!("^{}$", pattern.replace("{lit}", LIT));
    Form {
        verb,
        regex: Regex::new(&source).expect("canonical form regex"),
        has_value,
    }
}

// Order matters: `Verify page contains` before the generic `Verify "v" in "t"`.
static FORMS: Lazy<Vec<Form>> = Lazy::new(|| {
    vec![
        form(Verb::NavigateBack, "Navigate back to {lit}", false),
        form(Verb::Navigate, "Navigate to {lit}", false),
        form(Verb::Enter, "Enter {lit} into {lit}", true),
        form(Verb::Clear, "Clear {lit}", false),
        form(Verb::Select, "Select {lit} in {lit}", true),
        form(Verb::Click, "Click {lit}", false),
        form(
            Verb::Verify(Check::PageContains),
            "Verify page contains {lit}",
            false,
        ),
        form(
            Verb::Verify(Check::ResultContains),
            "Verify result contains {lit}",
            false,
        ),
        form(
            Verb::Verify(Check::NoValidResult),
            "Verify no valid result for {lit}",
            false,
        ),
        form(Verb::Verify(Check::Condition), "Verify that {lit}", false),
        form(Verb::Verify(Check::FieldValue), "Verify {lit} in {lit}", true),
    ]
});

/// Make a literal safe for the grammar: `"` becomes `'`, `<`/`>` are dropped,
/// whitespace is collapsed.
pub fn sanitize_literal(raw: &str) -> String {
    raw.replace('"', "'")
        .replace(['<', '>'], "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a string that is already in canonical form.
pub fn parse_canonical(raw: &str) -> Option<CanonicalStep> {
    let raw = raw.trim();
    for form in FORMS.iter() {
        let Some(caps) = form.regex.captures(raw) else {
            continue;
        };
        let (value, target) = if form.has_value {
            (caps.get(1).map(|m| m.as_str()), caps.get(2)?.as_str())
        } else {
            (None, caps.get(1)?.as_str())
        };
        let step = CanonicalStep {
            verb: form.verb,
            value: value.map(str::to_string),
            target: target.to_string(),
        };
        // reject strings that only look canonical (stray `<`, double spaces)
        let dirty = step
            .literals()
            .iter()
            .any(|literal| literal.is_empty() || sanitize_literal(literal) != *literal);
        if dirty || step.render() != raw {
            return None;
        }
        return Some(step);
    }
    None
}
