use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Kind of assertion carried by a `Verify` step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Exact display text somewhere on the page
    PageContains,
    /// Numeric result area contains the literal (oracle amounts)
    ResultContains,
    /// Invalid input produced no valid result
    NoValidResult,
    /// A field holds a value
    FieldValue,
    /// Qualitative check named by its text
    Condition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Navigate,
    NavigateBack,
    Enter,
    Clear,
    Select,
    Click,
    Verify(Check),
}

impl Verb {
    pub fn name(&self) -> &'static str {
        match self {
            Verb::Navigate => "navigate",
            Verb::NavigateBack => "navigate_back",
            Verb::Enter => "enter",
            Verb::Clear => "clear",
            Verb::Select => "select",
            Verb::Click => "click",
            Verb::Verify(_) => "verify",
        }
    }

    pub fn is_navigation(&self) -> bool {
        matches!(self, Verb::Navigate | Verb::NavigateBack)
    }

    /// Steps that put data into a form.
    pub fn is_form_entry(&self) -> bool {
        matches!(self, Verb::Enter | Verb::Clear | Verb::Select)
    }

    pub fn takes_value(&self) -> bool {
        matches!(
            self,
            Verb::Enter | Verb::Select | Verb::Verify(Check::FieldValue)
        )
    }
}

/// One step of the canonical grammar.
///
/// Literals never contain `"`, `<` or `>`; rendering then parsing yields the
/// same `(verb, value, target)` triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalStep {
    pub verb: Verb,
    pub value: Option<String>,
    pub target: String,
}

impl CanonicalStep {
    fn build(verb: Verb, value: Option<&str>, target: &str) -> Self {
        Self {
            verb,
            value: value.map(crate::grammar::sanitize_literal),
            target: crate::grammar::sanitize_literal(target),
        }
    }

    pub fn navigate(target: &str) -> Self {
        Self::build(Verb::Navigate, None, target)
    }

    pub fn navigate_back(target: &str) -> Self {
        Self::build(Verb::NavigateBack, None, target)
    }

    pub fn enter(value: &str, target: &str) -> Self {
        Self::build(Verb::Enter, Some(value), target)
    }

    pub fn clear(target: &str) -> Self {
        Self::build(Verb::Clear, None, target)
    }

    pub fn select(value: &str, target: &str) -> Self {
        Self::build(Verb::Select, Some(value), target)
    }

    pub fn click(target: &str) -> Self {
        Self::build(Verb::Click, None, target)
    }

    pub fn verify(check: Check, target: &str) -> Self {
        Self::build(Verb::Verify(check), None, target)
    }

    pub fn verify_field(value: &str, target: &str) -> Self {
        Self::build(Verb::Verify(Check::FieldValue), Some(value), target)
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Literals in surface order (value before target).
    pub fn literals(&self) -> Vec<&str> {
        match (&self.value, self.verb.takes_value()) {
            (Some(value), true) => vec![value.as_str(), self.target.as_str()],
            _ => vec![self.target.as_str()],
        }
    }

    pub fn render(&self) -> String {
        let value = self.value.as_deref().unwrap_or("");
        let target = &self.target;
        match self.verb {
            Verb::Navigate => format!("Navigate to \"{target}\""),
            Verb::NavigateBack => format!("Navigate back to \"{target}\""),
            Verb::Enter => format!("Enter \"{value}\" into \"{target}\""),
            Verb::Clear => format!("Clear \"{target}\""),
            Verb::Select => format!("Select \"{value}\" in \"{target}\""),
            Verb::Click => format!("Click \"{target}\""),
            Verb::Verify(Check::PageContains) => format!("Verify page contains \"{target}\""),
            Verb::Verify(Check::ResultContains) => {
                format!("Verify result contains \"{target}\"")
            }
            Verb::Verify(Check::NoValidResult) => {
                format!("Verify no valid result for \"{target}\"")
            }
            Verb::Verify(Check::FieldValue) => format!("Verify \"{value}\" in \"{target}\""),
            Verb::Verify(Check::Condition) => format!("Verify that \"{target}\""),
        }
    }
}

impl fmt::Display for CanonicalStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl std::str::FromStr for CanonicalStep {
    type Err = crate::errors::CanonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::grammar::parse_canonical(s).ok_or_else(|| crate::errors::CanonError::NotCanonical {
            input: s.to_string(),
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscardReason {
    UnknownVerb,
    Empty,
    MissingTarget,
    Unsupported,
}

impl DiscardReason {
    pub fn name(&self) -> &'static str {
        match self {
            DiscardReason::UnknownVerb => "unknown_verb",
            DiscardReason::Empty => "empty",
            DiscardReason::MissingTarget => "missing_target",
            DiscardReason::Unsupported => "unsupported",
        }
    }
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CanonOutcome {
    Canonicalized(CanonicalStep),
    Discarded(DiscardReason),
}

impl CanonOutcome {
    pub fn step(&self) -> Option<&CanonicalStep> {
        match self {
            CanonOutcome::Canonicalized(step) => Some(step),
            CanonOutcome::Discarded(_) => None,
        }
    }

    pub fn into_step(self) -> Option<CanonicalStep> {
        match self {
            CanonOutcome::Canonicalized(step) => Some(step),
            CanonOutcome::Discarded(_) => None,
        }
    }
}

/// Structured step as produced by the scenario generator
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StepRecord {
    #[serde(alias = "type", deserialize_with = "loose_text")]
    pub action: Option<String>,
    #[serde(alias = "field", alias = "element", deserialize_with = "loose_text")]
    pub target: Option<String>,
    #[serde(alias = "text", alias = "input", deserialize_with = "loose_text")]
    pub value: Option<String>,
    #[serde(alias = "step", deserialize_with = "loose_text")]
    pub description: Option<String>,
}

/// One AI-produced step: free text or a structured record.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawStep {
    Text(String),
    Record(StepRecord),
    /// Anything else (numbers, arrays, null); always discarded
    Other(serde_json::Value),
}

impl RawStep {
    pub fn text(raw: impl Into<String>) -> Self {
        RawStep::Text(raw.into())
    }
}

/// Accept strings, numbers and booleans; nulls and blanks become `None`.
fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(number.to_string()),
        Some(serde_json::Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    }
    .map(|text| text.trim().to_string())
    .filter(|text| !text.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_every_verb() {
        assert_eq!(
            CanonicalStep::enter("100000", "loan amount").render(),
            "Enter \"100000\" into \"loan amount\""
        );
        assert_eq!(
            CanonicalStep::select("Annually", "ccompound").render(),
            "Select \"Annually\" in \"ccompound\""
        );
        assert_eq!(
            CanonicalStep::verify_field("6", "cinterestrate").render(),
            "Verify \"6\" in \"cinterestrate\""
        );
        assert_eq!(
            CanonicalStep::verify(Check::Condition, "result is displayed").render(),
            "Verify that \"result is displayed\""
        );
    }

    #[test]
    fn constructors_sanitize_literals() {
        let step = CanonicalStep::verify(Check::PageContains, "say \"hi\" <now>");
        assert_eq!(step.target, "say 'hi' now");
    }

    #[test]
    fn raw_steps_deserialize_leniently() {
        let steps: Vec<RawStep> = serde_json::from_str(
            r#"["Click \"x\"", {"action": "enter", "target": "loan amount", "value": 100000}, 42]"#,
        )
        .unwrap();
        assert_eq!(steps[0], RawStep::text("Click \"x\""));
        match &steps[1] {
            RawStep::Record(record) => {
                assert_eq!(record.action.as_deref(), Some("enter"));
                assert_eq!(record.value.as_deref(), Some("100000"));
            }
            other => panic!("expected record, got {other:?}"),
        }
        assert!(matches!(steps[2], RawStep::Other(_)));
    }
}
