//! Free-text and structured step canonicalization

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::debug;

use crate::grammar::{parse_canonical, sanitize_literal};
use crate::model::{CanonOutcome, CanonicalStep, Check, DiscardReason, RawStep, StepRecord, Verb};
use crate::policy::CanonPolicyView;

static LEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:\s*(?:[*•]|-\s|\d+[.)]|step\s*\d+\s*[:.)-]?)\s*)+").expect("leader regex")
});
static SINGLE_QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(^|[\s(\[])'([^']+)'"#).expect("single quote regex"));
static QUOTED: Lazy<Regex> = Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("quoted regex"));

static NAV_BACK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:navigate|go|return|head)\s+back(?:\s+to)?\s+(.+)$").expect("nav back regex")
});
static NAV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:navigate\s+to|go\s+to|browse\s+to|open|visit|load)\s+(.+)$")
        .expect("nav regex")
});
static ENTER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:enter|type|input|fill\s+in|fill)\s+(.+)$").expect("enter regex")
});
static CLEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:clear|empty)\s+(.+)$").expect("clear regex"));
static SELECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:select|choose|pick)\s+(.+)$").expect("select regex"));
static CLICK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:click\s+on|click|press|tap|hit)\s+(.+)$").expect("click regex")
});
static VERIFY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:verify|assert|check|ensure|confirm|validate|expect)\s+(?:that\s+)?(.+)$")
        .expect("verify regex")
});
static BARE_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:navigate|go|open|visit|enter|type|input|fill|clear|select|choose|click|press|tap|verify|assert|check|ensure)\b",
    )
    .expect("bare verb regex")
});

static PAGE_CONTAINS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:the\s+)?page\s+(?:contains|displays|shows|has)\s+(?:the\s+)?(?:text\s+)?(.+)$")
        .expect("page contains regex")
});
static IS_DISPLAYED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)^(?:the\s+)?(?:text\s+)?("[^"]*")\s+is\s+(?:displayed|visible|shown|present)\b"#)
        .expect("is displayed regex")
});
static RESULT_CONTAINS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(?:the\s+)?(?:monthly\s+payment|payment|results?)\s+(?:contains|shows|displays|equals|is)\s+(.+)$",
    )
    .expect("result contains regex")
});
static NO_VALID_RESULT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^no\s+valid\s+results?\s+(?:for|with)\s+(.+)$").expect("no valid regex")
});
static NUMERIC_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[$€£]?\s*-?[\d,]+(?:\.\d+)?\s*%?$").expect("numeric regex"));

/// Connectors placing the value before the target (`Enter "5" into "rate"`).
const ENTER_VALUE_FIRST: &[&str] = &["into", "in", "to", "on"];
const SELECT_VALUE_FIRST: &[&str] = &["in", "from", "for", "on"];
/// Connectors placing the target before the value (`Enter "rate" with "5"`).
const TARGET_FIRST: &[&str] = &["with", "as", "=", ":", "to"];

const SEARCH_PHRASES: &[&str] = &["search", "search term", "search box", "search field", "search bar"];

#[derive(Clone, Debug, Default)]
pub struct Canonicalizer {
    policy: CanonPolicyView,
}

impl Canonicalizer {
    pub fn new(policy: CanonPolicyView) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CanonPolicyView {
        &self.policy
    }

    pub fn canonicalize(&self, raw: &RawStep) -> CanonOutcome {
        let outcome = match raw {
            RawStep::Text(text) => self.canonicalize_text(text),
            RawStep::Record(record) => self.canonicalize_record(record),
            RawStep::Other(_) => CanonOutcome::Discarded(DiscardReason::Unsupported),
        };
        debug!(?raw, ?outcome, "canonicalized step");
        outcome
    }

    pub fn canonicalize_text(&self, raw: &str) -> CanonOutcome {
        let stripped = LEADER.replace(raw.trim(), "");
        let stripped = stripped.trim();
        if stripped.is_empty() {
            return CanonOutcome::Discarded(DiscardReason::Empty);
        }
        if let Some(step) = parse_canonical(stripped) {
            return self.finish(step);
        }

        let text = normalize_quotes(stripped);
        let text = text.trim().trim_end_matches(['.', ';']).trim();

        if let Some(caps) = NAV_BACK.captures(text) {
            return self.single(Verb::NavigateBack, &caps[1], clean_navigation);
        }
        if let Some(caps) = NAV.captures(text) {
            return self.single(Verb::Navigate, &caps[1], clean_navigation);
        }
        if let Some(caps) = ENTER.captures(text) {
            return self.entry(Verb::Enter, &caps[1]);
        }
        if let Some(caps) = CLEAR.captures(text) {
            return self.single(Verb::Clear, &caps[1], clean_field);
        }
        if let Some(caps) = SELECT.captures(text) {
            return self.entry(Verb::Select, &caps[1]);
        }
        if let Some(caps) = CLICK.captures(text) {
            return self.single(Verb::Click, &caps[1], clean_clickable);
        }
        if let Some(caps) = VERIFY.captures(text) {
            return self.verification(&caps[1]);
        }
        if BARE_VERB.is_match(text) {
            return CanonOutcome::Discarded(DiscardReason::MissingTarget);
        }
        CanonOutcome::Discarded(DiscardReason::UnknownVerb)
    }

    pub fn canonicalize_record(&self, record: &StepRecord) -> CanonOutcome {
        let action = record
            .action
            .as_deref()
            .map(|a| a.trim().to_lowercase().replace([' ', '-'], "_"))
            .unwrap_or_default();
        let target = record.target.as_deref();
        let value = record.value.as_deref();

        let outcome = match action.as_str() {
            "navigate" | "navigate_to" | "goto" | "go_to" | "open" | "visit" => target
                .or(value)
                .map(|t| self.finish(CanonicalStep::navigate(&clean_navigation(t)))),
            "navigate_back" | "go_back" | "back" | "return" => target
                .or(value)
                .map(|t| self.finish(CanonicalStep::navigate_back(&clean_navigation(t)))),
            "enter" | "type" | "type_text" | "input" | "fill" | "set" => {
                target.map(|t| self.entered(Verb::Enter, value.unwrap_or(""), t))
            }
            "clear" => target.map(|t| self.finish(CanonicalStep::clear(&self.concept(t)))),
            "select" | "select_option" | "choose" => match (value, target) {
                (Some(v), Some(t)) => Some(self.entered(Verb::Select, v, t)),
                _ => None,
            },
            "click" | "press" | "tap" => target
                .or(value)
                .map(|t| self.finish(CanonicalStep::click(&clean_clickable(t)))),
            "verify" | "assert" | "check" | "expect" => match (value, target) {
                (Some(v), Some(t)) if is_result_phrase(t) => {
                    Some(self.finish(CanonicalStep::verify(Check::ResultContains, v)))
                }
                (Some(text), _) | (None, Some(text)) => {
                    Some(self.finish(CanonicalStep::verify(Check::PageContains, text)))
                }
                (None, None) => None,
            },
            _ => None,
        };

        match outcome {
            Some(CanonOutcome::Canonicalized(step)) => CanonOutcome::Canonicalized(step),
            failed => match record.description.as_deref() {
                Some(description) => match self.canonicalize_text(description) {
                    CanonOutcome::Canonicalized(step) => CanonOutcome::Canonicalized(step),
                    CanonOutcome::Discarded(reason) => {
                        CanonOutcome::Discarded(failed_reason(&action, failed).unwrap_or(reason))
                    }
                },
                None => CanonOutcome::Discarded(
                    failed_reason(&action, failed).unwrap_or(if action.is_empty() {
                        DiscardReason::Empty
                    } else {
                        DiscardReason::UnknownVerb
                    }),
                ),
            },
        }
    }

    fn single(&self, verb: Verb, rest: &str, clean: fn(&str) -> String) -> CanonOutcome {
        let literal = first_quoted(rest).unwrap_or_else(|| clean(rest));
        let literal = if verb == Verb::Clear {
            self.concept(&literal)
        } else {
            literal
        };
        self.finish(CanonicalStep {
            verb,
            value: None,
            target: literal,
        })
    }

    /// `Enter`/`Select` with a value and a target in any tolerated layout.
    fn entry(&self, verb: Verb, rest: &str) -> CanonOutcome {
        let value_first = if verb == Verb::Select {
            SELECT_VALUE_FIRST
        } else {
            ENTER_VALUE_FIRST
        };
        let quoted: Vec<_> = QUOTED.captures_iter(rest).collect();

        let pair = match quoted.len() {
            0 => self.unquoted_entry(verb, rest),
            1 => {
                let whole = quoted[0].get(0).map(|m| (m.start(), m.end()));
                let literal = quoted[0][1].to_string();
                whole.and_then(|(start, end)| {
                    let before = rest[..start].trim();
                    let after = rest[end..].trim();
                    if let Some(target) = strip_connector(after, value_first) {
                        Some((literal, target))
                    } else if !before.is_empty() {
                        let target = strip_trailing_connector(before, TARGET_FIRST);
                        Some((literal, target))
                    } else {
                        None
                    }
                })
            }
            _ => {
                let first = &quoted[0];
                let second = &quoted[1];
                let (first_end, second_start) = match (first.get(0), second.get(0)) {
                    (Some(a), Some(b)) => (a.end(), b.start()),
                    _ => return CanonOutcome::Discarded(DiscardReason::MissingTarget),
                };
                let connector = rest[first_end..second_start].trim().to_lowercase();
                if TARGET_FIRST.contains(&connector.as_str()) && verb == Verb::Select
                    || matches!(connector.as_str(), "with" | "as" | "=" | ":")
                {
                    Some((second[1].to_string(), first[1].to_string()))
                } else {
                    Some((first[1].to_string(), second[1].to_string()))
                }
            }
        };

        match pair {
            Some((value, target)) => self.entered(verb, &value, &target),
            None => CanonOutcome::Discarded(DiscardReason::MissingTarget),
        }
    }

    fn unquoted_entry(&self, verb: Verb, rest: &str) -> Option<(String, String)> {
        let lower = rest.to_lowercase();
        if verb == Verb::Enter {
            for phrase in ["search term ", "search for ", "search "] {
                if lower.starts_with(phrase) {
                    let value = rest.get(phrase.len()..).unwrap_or("").trim();
                    return (!value.is_empty())
                        .then(|| (value.to_string(), self.policy.search_concept.clone()));
                }
            }
        }
        let splitter = if verb == Verb::Enter { " into " } else { " from " };
        if let Some(idx) = lower.find(splitter) {
            let value = rest.get(..idx).unwrap_or("").trim();
            let target = rest.get(idx + splitter.len()..).unwrap_or("").trim();
            if !value.is_empty() && !target.is_empty() {
                return Some((value.to_string(), target.to_string()));
            }
        }
        let tokens: Vec<&str> = rest.split_whitespace().collect();
        if tokens.len() < 2 {
            return None;
        }
        let (value, target) = tokens.split_last()?;
        Some((value.to_string(), target.join(" ")))
    }

    fn entered(&self, verb: Verb, value: &str, target: &str) -> CanonOutcome {
        let target = self.concept(&clean_field(target));
        let value = value.trim();
        match verb {
            Verb::Enter if value.is_empty() => self.finish(CanonicalStep::clear(&target)),
            Verb::Enter => self.finish(CanonicalStep::enter(value, &target)),
            Verb::Select if value.is_empty() => CanonOutcome::Discarded(DiscardReason::MissingTarget),
            _ => self.finish(CanonicalStep::select(value, &target)),
        }
    }

    fn verification(&self, rest: &str) -> CanonOutcome {
        let rest = rest.trim();
        if let Some(caps) = NO_VALID_RESULT.captures(rest) {
            return self.checked(Check::NoValidResult, &caps);
        }
        if let Some(caps) = PAGE_CONTAINS.captures(rest) {
            return self.checked(Check::PageContains, &caps);
        }
        if let Some(caps) = IS_DISPLAYED.captures(rest) {
            return self.checked(Check::PageContains, &caps);
        }
        if let Some(caps) = RESULT_CONTAINS.captures(rest) {
            let literal = literal_of(&caps[1]);
            if caps[1].trim().starts_with('"') || NUMERIC_LITERAL.is_match(&literal) {
                return self.finish(CanonicalStep::verify(Check::ResultContains, &literal));
            }
        }
        let quoted: Vec<_> = QUOTED.captures_iter(rest).collect();
        if quoted.len() == 2 {
            if let (Some(a), Some(b)) = (quoted[0].get(0), quoted[1].get(0)) {
                let connector = rest[a.end()..b.start()].trim().to_lowercase();
                if connector == "in" || connector == "is in" {
                    return self.finish(CanonicalStep::verify_field(&quoted[0][1], &quoted[1][1]));
                }
            }
        }
        if quoted.len() == 1 && quoted[0].get(0).map(|m| m.as_str()) == Some(rest) {
            return self.finish(CanonicalStep::verify(Check::PageContains, &quoted[0][1]));
        }
        self.finish(CanonicalStep::verify(Check::Condition, &literal_of(rest)))
    }

    fn checked(&self, check: Check, caps: &Captures<'_>) -> CanonOutcome {
        self.finish(CanonicalStep::verify(check, &literal_of(&caps[1])))
    }

    /// Map search-box phrases to the configured search concept.
    fn concept(&self, target: &str) -> String {
        let lowered = target.trim().to_lowercase();
        if SEARCH_PHRASES.contains(&lowered.as_str()) {
            self.policy.search_concept.clone()
        } else {
            target.trim().to_string()
        }
    }

    fn finish(&self, mut step: CanonicalStep) -> CanonOutcome {
        step.target = truncate(&sanitize_literal(&step.target), self.policy.max_literal_len);
        step.value = step
            .value
            .map(|value| truncate(&sanitize_literal(&value), self.policy.max_literal_len));
        if step.target.is_empty() {
            return CanonOutcome::Discarded(DiscardReason::MissingTarget);
        }
        // a value that sanitized away reads the same as an empty one in `entered`
        if step.verb.takes_value() && step.value.as_deref().map_or(true, str::is_empty) {
            return match step.verb {
                Verb::Enter => CanonOutcome::Canonicalized(CanonicalStep::clear(&step.target)),
                _ => CanonOutcome::Discarded(DiscardReason::MissingTarget),
            };
        }
        CanonOutcome::Canonicalized(step)
    }
}

fn failed_reason(action: &str, failed: Option<CanonOutcome>) -> Option<DiscardReason> {
    match failed {
        Some(CanonOutcome::Discarded(reason)) => Some(reason),
        // a known action whose record lacked the fields it needs
        None if !action.is_empty() && is_known_action(action) => Some(DiscardReason::MissingTarget),
        _ => None,
    }
}

fn is_known_action(action: &str) -> bool {
    matches!(
        action,
        "navigate"
            | "navigate_to"
            | "goto"
            | "go_to"
            | "open"
            | "visit"
            | "navigate_back"
            | "go_back"
            | "back"
            | "return"
            | "enter"
            | "type"
            | "type_text"
            | "input"
            | "fill"
            | "set"
            | "clear"
            | "select"
            | "select_option"
            | "choose"
            | "click"
            | "press"
            | "tap"
            | "verify"
            | "assert"
            | "check"
            | "expect"
    )
}

fn is_result_phrase(target: &str) -> bool {
    matches!(
        target.trim().to_lowercase().as_str(),
        "result" | "results" | "payment" | "monthly payment"
    )
}

/// Curly quotes become straight ones; single-quoted literals become
/// double-quoted unless the text already uses double quotes.
fn normalize_quotes(text: &str) -> String {
    let straight = text.replace(['\u{201c}', '\u{201d}'], "\"").replace(['\u{2018}', '\u{2019}'], "'");
    if straight.contains('"') {
        return straight;
    }
    SINGLE_QUOTED
        .replace_all(&straight, "${1}\"${2}\"")
        .into_owned()
}

fn first_quoted(text: &str) -> Option<String> {
    QUOTED.captures(text).map(|caps| caps[1].to_string())
}

fn literal_of(text: &str) -> String {
    let text = text.trim();
    first_quoted(text)
        .filter(|_| text.starts_with('"'))
        .unwrap_or_else(|| text.trim_end_matches('.').to_string())
}

fn strip_article(text: &str) -> &str {
    let trimmed = text.trim();
    let lower = trimmed.to_lowercase();
    for article in ["the ", "a ", "an "] {
        if lower.starts_with(article) {
            if let Some(rest) = trimmed.get(article.len()..) {
                return rest.trim();
            }
        }
    }
    trimmed
}

fn strip_suffix_word<'a>(text: &'a str, words: &[&str]) -> &'a str {
    let lower = text.to_lowercase();
    for word in words {
        let suffix = format!(" {word}");
        if lower.ends_with(&suffix) && text.len() > suffix.len() {
            if let Some(head) = text.get(..text.len() - suffix.len()) {
                return head.trim();
            }
        }
    }
    text
}

fn clean_navigation(text: &str) -> String {
    first_quoted(text).unwrap_or_else(|| strip_article(text).to_string())
}

fn clean_field(text: &str) -> String {
    let text = strip_article(text);
    strip_suffix_word(text, &["field", "input", "box", "dropdown"]).to_string()
}

fn clean_clickable(text: &str) -> String {
    let text = strip_article(text);
    let text = text
        .strip_prefix("on ")
        .map(strip_article)
        .unwrap_or(text);
    strip_suffix_word(text, &["button", "link", "tab", "icon"]).to_string()
}

fn strip_connector(text: &str, connectors: &[&str]) -> Option<String> {
    let lower = text.to_lowercase();
    connectors.iter().find_map(|connector| {
        let prefix = format!("{connector} ");
        lower
            .starts_with(&prefix)
            .then(|| text.get(prefix.len()..).unwrap_or("").trim().to_string())
            .filter(|target| !target.is_empty())
    })
}

fn strip_trailing_connector(text: &str, connectors: &[&str]) -> String {
    let lower = text.to_lowercase();
    for connector in connectors {
        let suffix = format!(" {connector}");
        if lower.ends_with(&suffix) {
            if let Some(head) = text.get(..text.len().saturating_sub(suffix.len())) {
                return head.trim().to_string();
            }
        }
    }
    text.trim().to_string()
}

fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(text: &str) -> String {
        match Canonicalizer::default().canonicalize_text(text) {
            CanonOutcome::Canonicalized(step) => step.render(),
            CanonOutcome::Discarded(reason) => format!("discarded:{reason}"),
        }
    }

    #[test]
    fn navigation_gains_quotes() {
        assert_eq!(canon("Navigate to /loan-calculator.html"), "Navigate to \"/loan-calculator.html\"");
        assert_eq!(canon("go to 'https://x.test/a'"), "Navigate to \"https://x.test/a\"");
        assert_eq!(canon("Go back to the home page"), "Navigate back to \"home page\"");
    }

    #[test]
    fn entry_layouts() {
        assert_eq!(canon("Enter loan amount 100000"), "Enter \"100000\" into \"loan amount\"");
        assert_eq!(canon("Enter loan amount \"100000\""), "Enter \"100000\" into \"loan amount\"");
        assert_eq!(canon("Type '6' into 'interest rate'"), "Enter \"6\" into \"interest rate\"");
        assert_eq!(canon("Fill in \"loan term\" with \"30\""), "Enter \"30\" into \"loan term\"");
        assert_eq!(canon("input 250000 into the house price field"), "Enter \"250000\" into \"house price\"");
        assert_eq!(canon("enter search term mortgage payoff"), "Enter \"mortgage payoff\" into \"search term\"");
    }

    #[test]
    fn select_and_click() {
        assert_eq!(canon("Select compounding annually"), "Select \"annually\" in \"compounding\"");
        assert_eq!(canon("choose \"Annually\" from \"compound\""), "Select \"Annually\" in \"compound\"");
        assert_eq!(canon("Click the Calculate button"), "Click \"Calculate\"");
        assert_eq!(canon("press on the sign in link"), "Click \"sign in\"");
    }

    #[test]
    fn verify_shapes() {
        assert_eq!(canon("Verify the page contains \"Loan Calculator\""), "Verify page contains \"Loan Calculator\"");
        assert_eq!(canon("Assert 'Sign In' is displayed"), "Verify page contains \"Sign In\"");
        assert_eq!(canon("Check the monthly payment is $599.55"), "Verify result contains \"$599.55\"");
        assert_eq!(canon("Ensure that result is displayed"), "Verify that \"result is displayed\"");
        assert_eq!(canon("verify \"6\" in \"interest rate\""), "Verify \"6\" in \"interest rate\"");
        assert_eq!(canon("Verify no valid result for -5"), "Verify no valid result for \"-5\"");
    }

    #[test]
    fn discards_with_reason() {
        assert_eq!(canon("   "), "discarded:empty");
        assert_eq!(canon("Wait for 3 seconds"), "discarded:unknown_verb");
        assert_eq!(canon("Click"), "discarded:missing_target");
        assert_eq!(canon("Enter 100000"), "discarded:missing_target");
    }

    #[test]
    fn bullets_and_numbering_are_stripped() {
        assert_eq!(canon("* Click \"x\""), "Click \"x\"");
        assert_eq!(canon("2. Click Calculate"), "Click \"Calculate\"");
        assert_eq!(canon("Step 3: Clear the loan amount field"), "Clear \"loan amount\"");
    }

    #[test]
    fn records_use_verb_table() {
        let canon = Canonicalizer::default();
        let record = StepRecord {
            action: Some("Enter".into()),
            target: Some("loan_amount".into()),
            value: Some("100000".into()),
            description: None,
        };
        assert_eq!(
            canon.canonicalize_record(&record).step().map(|s| s.render()),
            Some("Enter \"100000\" into \"loan_amount\"".to_string())
        );

        let empty_value = StepRecord {
            action: Some("type".into()),
            target: Some("loan amount".into()),
            ..Default::default()
        };
        assert_eq!(
            canon.canonicalize_record(&empty_value).step().map(|s| s.render()),
            Some("Clear \"loan amount\"".to_string())
        );

        let unknown = StepRecord {
            action: Some("hover".into()),
            description: Some("Click the Clear button".into()),
            ..Default::default()
        };
        assert_eq!(
            canon.canonicalize_record(&unknown).step().map(|s| s.render()),
            Some("Click \"Clear\"".to_string())
        );

        let verify = StepRecord {
            action: Some("verify".into()),
            value: Some("Loan Calculator".into()),
            ..Default::default()
        };
        assert_eq!(
            canon.canonicalize_record(&verify).step().map(|s| s.render()),
            Some("Verify page contains \"Loan Calculator\"".to_string())
        );

        let bare = StepRecord {
            action: Some("click".into()),
            ..Default::default()
        };
        assert_eq!(
            canon.canonicalize_record(&bare),
            CanonOutcome::Discarded(DiscardReason::MissingTarget)
        );
        assert_eq!(
            canon.canonicalize_record(&StepRecord::default()),
            CanonOutcome::Discarded(DiscardReason::Empty)
        );
    }
}
