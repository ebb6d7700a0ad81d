use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use step_canon::CanonicalStep;

static SLOT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<[^<>"]*>|"[^"]*""#).expect("template slot regex"));

/// One literal position of a step template
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Slot {
    /// Parameter supplied by the step text at run time
    Hole { name: String },
    /// Literal fixed by the matched pattern
    Pinned { literal: String },
}

/// Parameterized shape of a canonical step.
///
/// `Enter "100000" into "cloanamount"` becomes `Enter <value> into <element_id>`;
/// pinned literals stay quoted (`Verify that "page loaded successfully"`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct StepTemplate {
    text: String,
    slots: Vec<Slot>,
}

impl StepTemplate {
    /// Shape `step` with one slot per literal, in surface order.
    pub fn from_step(step: &CanonicalStep, slots: Vec<Slot>) -> Self {
        let mut shaped = step.clone();
        let mut fill = slots.iter().map(|slot| match slot {
            Slot::Hole { name } => format!("<{name}>"),
            Slot::Pinned { literal } => literal.clone(),
        });
        if step.verb.takes_value() && step.value.is_some() {
            shaped.value = fill.next();
        }
        if let Some(target) = fill.next() {
            shaped.target = target;
        }

        let mut text = shaped.render();
        for slot in &slots {
            if let Slot::Hole { name } = slot {
                text = text.replace(&format!("\"<{name}>\""), &format!("<{name}>"));
            }
        }
        Self { text, slots }
    }

    /// Template with every literal turned into a positional hole.
    pub fn positional(step: &CanonicalStep) -> Self {
        let slots = (1..=step.literals().len())
            .map(|i| Slot::Hole {
                name: format!("arg{i}"),
            })
            .collect();
        Self::from_step(step, slots)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Hole names in parameter order.
    pub fn holes(&self) -> Vec<&str> {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Hole { name } => Some(name.as_str()),
                Slot::Pinned { .. } => None,
            })
            .collect()
    }

    pub fn is_pinned(&self) -> bool {
        self.slots
            .iter()
            .any(|slot| matches!(slot, Slot::Pinned { .. }))
    }

    /// Shape as the step runner sees it: every slot is a parameter.
    pub fn signature(&self) -> String {
        self.substitute(|_| "{}".to_string())
    }

    /// Text with every slot, pinned or not, replaced by `<names[i]>`.
    pub fn with_parameters(&self, names: &[String]) -> String {
        self.substitute(|i| match names.get(i) {
            Some(name) => format!("<{name}>"),
            None => format!("<arg{}>", i + 1),
        })
    }

    /// Text with slot `i` replaced by `slot(i)`.
    pub fn substitute(&self, mut slot: impl FnMut(usize) -> String) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut last = 0;
        for (i, m) in SLOT.find_iter(&self.text).enumerate() {
            out.push_str(&self.text[last..m.start()]);
            out.push_str(&slot(i));
            last = m.end();
        }
        out.push_str(&self.text[last..]);
        out
    }
}

impl fmt::Display for StepTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
