use std::fmt::Write as _;

use indexmap::IndexMap;

use spec_compiler::CompiledScenario;

use crate::bodies::MODULE_HEADER;
use crate::generator::{slug, Binding, BindingSet};
use crate::policy::BindingPolicyView;
use crate::template::Slot;

/// Double-quoted Python string literal.
pub fn py_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Specification text: suite header, then one block per scenario.
pub fn render_spec(suite_title: &str, scenarios: &[CompiledScenario]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "# {}", one_line(suite_title));
    for scenario in scenarios {
        out.push('\n');
        let _ = writeln!(out, "## {}: {}", scenario.id, one_line(&scenario.title));
        if !scenario.tags.is_empty() {
            let _ = writeln!(out, "tags: {}", scenario.tags.join(", "));
        }
        out.push('\n');
        for step in scenario.rendered_steps() {
            let _ = writeln!(out, "* {step}");
        }
    }
    out
}

fn indent(body: &str) -> String {
    body.lines()
        .map(|line| {
            if line.trim().is_empty() {
                String::new()
            } else {
                format!("    {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Step-implementation module for the binding set.
pub fn render_bindings(set: &BindingSet, policy: &BindingPolicyView) -> String {
    let mut out = MODULE_HEADER
        .replace("@BASE_URL@", &py_str(&policy.base_url))
        .replace("@WAIT_TIMEOUT@", &policy.wait_timeout_secs.to_string())
        .replace("@HEADLESS@", if policy.headless { "True" } else { "False" });

    // the runner keys steps on their parameterized shape
    let mut groups: IndexMap<String, Vec<&Binding>> = IndexMap::new();
    for binding in set.bindings() {
        groups
            .entry(binding.template.signature())
            .or_default()
            .push(binding);
    }

    for (signature, members) in &groups {
        out.push_str("\n\n");
        match members.as_slice() {
            [only] if !only.template.is_pinned() => render_decorated(&mut out, only),
            _ => render_dispatch(&mut out, signature, members),
        }
    }
    out
}

fn render_decorated(out: &mut String, binding: &Binding) {
    let _ = writeln!(out, "@step({})", py_str(binding.template.text()));
    let _ = writeln!(out, "def {}({}):", binding.name, binding.params.join(", "));
    let _ = writeln!(out, "{}", indent(&binding.body));
}

fn render_dispatch(out: &mut String, signature: &str, members: &[&Binding]) {
    let generic = members.iter().find(|b| !b.template.is_pinned());
    debug_assert!(
        members.iter().filter(|b| !b.template.is_pinned()).count() <= 1,
        "more than one unpinned binding for `{signature}`"
    );
    let Some(first) = members.first() else {
        return;
    };

    for member in members.iter().filter(|b| b.template.is_pinned()) {
        let _ = writeln!(out, "def {}({}):", member.name, member.params.join(", "));
        let _ = writeln!(out, "{}\n\n", indent(&member.body));
    }

    let (name, params) = match generic {
        Some(binding) => (binding.name.clone(), binding.params.clone()),
        None => (
            format!("dispatch_{}", slug(&signature.replace("{}", ""))),
            (1..=first.template.slots().len())
                .map(|i| format!("arg{i}"))
                .collect(),
        ),
    };

    let _ = writeln!(
        out,
        "@step({})",
        py_str(&first.template.with_parameters(&params))
    );
    let _ = writeln!(out, "def {name}({}):", params.join(", "));
    for member in members.iter().filter(|b| b.template.is_pinned()) {
        let mut conditions = Vec::new();
        let mut args = Vec::new();
        for (slot, param) in member.template.slots().iter().zip(&params) {
            match slot {
                Slot::Pinned { literal } => conditions.push(format!("{param} == {}", py_str(literal))),
                Slot::Hole { .. } => args.push(param.as_str()),
            }
        }
        let _ = writeln!(out, "    if {}:", conditions.join(" and "));
        let _ = writeln!(out, "        return {}({})", member.name, args.join(", "));
    }
    match generic {
        Some(binding) => {
            let _ = writeln!(out, "{}", indent(&binding.body));
        }
        None => {
            let shown = first
                .template
                .substitute(|i| format!("'{{{}}}'", params.get(i).map_or("", String::as_str)));
            let _ = writeln!(
                out,
                "    raise NotImplementedError(f{})",
                py_str(&format!("Step not implemented: {shown}"))
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::BindingGenerator;
    use crate::registry::{PatternRegistry, Pin, SlotSpec, StepPattern};
    use step_canon::{CanonicalStep, Check, Verb};

    #[test]
    fn python_strings_escape_quotes_and_backslashes() {
        assert_eq!(py_str(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn plain_templates_are_decorated_directly() {
        let set = BindingGenerator::new(PatternRegistry::standard(Default::default()))
            .generate_steps(&[CanonicalStep::click("calculate")]);
        let module = render_bindings(&set, &BindingPolicyView::default());
        assert!(module.contains("BASE_URL = \"https://www.calculator.net\""));
        assert!(module.contains("WAIT_TIMEOUT = 8\n"));
        assert!(module.contains("@step(\"Click <element_id>\")\ndef click_element(element_id):\n"));
    }

    #[test]
    fn pinned_conditions_route_through_one_step() {
        let steps = [
            CanonicalStep::verify(Check::Condition, "page loaded successfully"),
            CanonicalStep::verify(Check::Condition, "cart is empty"),
        ];
        let set = BindingGenerator::new(PatternRegistry::standard(Default::default()))
            .generate_steps(&steps);
        let module = render_bindings(&set, &BindingPolicyView::default());
        assert_eq!(module.matches("@step(\"Verify that <condition>\")").count(), 1);
        assert!(module.contains("def verify_page_loaded():\n"));
        assert!(module.contains(
            "    if condition == \"page loaded successfully\":\n        return verify_page_loaded()\n"
        ));
        assert!(module.contains("def verify_condition(condition):\n"));
    }

    #[test]
    fn pinned_only_groups_fail_loudly_for_other_values() {
        let set = BindingGenerator::new(PatternRegistry::standard(Default::default()))
            .generate_steps(&[CanonicalStep::verify(Check::Condition, "result is displayed")]);
        let module = render_bindings(&set, &BindingPolicyView::default());
        assert!(module.contains("@step(\"Verify that <arg1>\")\ndef dispatch_verify_that(arg1):\n"));
        assert!(module.contains(
            "    raise NotImplementedError(f\"Step not implemented: Verify that '{arg1}'\")"
        ));
    }

    #[test]
    fn pinned_members_fall_through_to_the_single_unpinned_one() {
        let registry = PatternRegistry::new(vec![StepPattern::new(
            "enter_into_dropdown",
            Verb::Enter,
            vec![
                SlotSpec::hole("value"),
                SlotSpec::Pin {
                    pin: Pin::OneOf(["ccompound".to_string()].into_iter().collect()),
                    bind: Some("element_id".to_string()),
                },
            ],
            "pass",
        )]);
        let set = BindingGenerator::new(registry).generate_steps(&[
            CanonicalStep::enter("Annually", "ccompound"),
            CanonicalStep::enter("100000", "cloanamount"),
        ]);
        assert_eq!(set.stub_count(), 1);

        let module = render_bindings(&set, &BindingPolicyView::default());
        assert_eq!(module.matches("@step(").count(), 1);
        assert!(module.contains("@step(\"Enter <arg1> into <arg2>\")\ndef enter_into(arg1, arg2):\n"));
        assert!(module.contains(
            "    if arg2 == \"ccompound\":\n        return enter_into_dropdown(arg1)\n"
        ));
        assert!(module.contains("    raise NotImplementedError(\"Step not implemented: Enter <arg1> into <arg2>\")"));
    }
}
