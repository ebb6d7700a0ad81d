use binding_gen::{
    render_bindings, render_spec, BindingGenerator, BindingKind, BindingPolicyView, PatternRegistry,
};
use page_knowledge::KnowledgeBase;
use spec_compiler::{CompilePolicyView, ScenarioDocument, SpecCompiler};

const KNOWLEDGE: &str = r#"{
  "site": {"search_locator": "calcSearchTerm", "dropdown_locators": ["ccompound"]},
  "pages": {
    "/loan-calculator.html": {
      "fields": {"loan amount": "cloanamount", "interest rate": "cinterestrate",
                 "loan term": "cloanterm", "compound": "ccompound"},
      "primary_action": "x"
    },
    "/my-account/sign-in.php": {
      "fields": {"email": "email", "password": "password"},
      "primary_action": "Sign In"
    }
  }
}"#;

const SCENARIOS: &str = r#"[
  {"url": "/loan-calculator.html", "module_name": "LOAN",
   "test_scenarios": [
     {"title": "Standard loan", "tags": "smoke, loan",
      "steps": ["Enter loan amount 100000", "Enter interest rate 6", "Enter loan term 30"]},
     {"title": "Annual compounding",
      "steps": ["Enter \"100000\" into \"loan amount\"", "Enter \"6\" into \"interest rate\"",
                "Enter \"30\" into \"loan term\"", "Select \"Annually\" in \"compound\""]},
     {"title": "Letters in amount", "category": "negative",
      "steps": ["Enter loan amount abc"]},
     {"title": "Typed compounding",
      "steps": ["Enter loan amount 100000", "Enter \"Annually\" into \"compound\""]}
   ]},
  {"url": "/my-account/sign-in.php", "module_name": "LOGIN",
   "test_scenarios": [
     {"title": "Valid login", "steps": ["Enter email 'a@b.com'", "Enter password 'pw'", "Click Sign In"]},
     {"title": "Page shows heading", "steps": ["Verify that \"sign in heading is visible\""]}
   ]}
]"#;

fn generate() -> (String, String, binding_gen::BindingSet) {
    let kb = KnowledgeBase::from_json_str(KNOWLEDGE).unwrap();
    let doc = ScenarioDocument::from_json_str(SCENARIOS).unwrap();
    let batch = SpecCompiler::new(CompilePolicyView::default()).compile_batch(&doc, &kb);
    let generator = BindingGenerator::new(PatternRegistry::standard(kb.all_dropdowns()));
    let set = generator.generate(&batch.scenarios);
    let spec = render_spec("Calculator Suite", &batch.scenarios);
    let module = render_bindings(&set, &BindingPolicyView::default());
    (spec, module, set)
}

#[test]
fn every_spec_step_has_exactly_one_binding() {
    let (spec, module, set) = generate();
    let steps: Vec<&str> = spec
        .lines()
        .filter_map(|line| line.strip_prefix("* "))
        .collect();
    assert!(!steps.is_empty());
    for step in &steps {
        assert!(set.for_step(step).is_some(), "unbound step: {step}");
    }

    let used: usize = set.bindings().iter().map(|b| b.uses).sum();
    assert_eq!(used, steps.len());
    for binding in set.bindings() {
        assert!(binding.uses > 0, "orphan binding {}", binding.name);
        assert!(
            module.contains(&format!("def {}(", binding.name)),
            "missing def for {}",
            binding.name
        );
    }

    let mut names: Vec<&str> = set.bindings().iter().map(|b| b.name.as_str()).collect();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), set.len());
    assert_eq!(set.stub_count(), 0);
}

#[test]
fn spec_text_layout() {
    let (spec, _, _) = generate();
    assert!(spec.starts_with("# Calculator Suite\n\n## LOAN_TC_001: Standard loan\ntags: smoke, loan\n\n* Navigate to \"/loan-calculator.html\"\n"));
    assert!(spec.contains("\n## LOGIN_TC_001: Valid login\n\n* Navigate to \"/my-account/sign-in.php\"\n"));
    assert!(!spec.contains("generated_at"));
}

#[test]
fn generation_is_byte_identical_across_runs() {
    let (spec_a, module_a, set_a) = generate();
    let (spec_b, module_b, set_b) = generate();
    assert_eq!(spec_a, spec_b);
    assert_eq!(module_a, module_b);
    assert_eq!(set_a.template_map(), set_b.template_map());
}

#[test]
fn condition_steps_share_one_runner_entry() {
    let (_, module, set) = generate();
    assert!(set.for_template("Verify that <condition>").is_some());
    assert_eq!(module.matches("@step(\"Verify that <condition>\")").count(), 1);
}

#[test]
fn dropdown_entry_gets_the_dropdown_binding() {
    let (spec, module, set) = generate();
    assert!(spec.contains("* Enter \"Annually\" into \"ccompound\"\n"));

    let dropdown = set.for_step("Enter \"Annually\" into \"ccompound\"").unwrap();
    assert_eq!(
        dropdown.kind,
        BindingKind::Pattern {
            pattern: "enter_into_dropdown".to_string()
        }
    );
    assert_eq!(dropdown.template.text(), "Enter <value> into \"ccompound\"");

    let generic = set.for_step("Enter \"100000\" into \"cloanamount\"").unwrap();
    assert_eq!(
        generic.kind,
        BindingKind::Pattern {
            pattern: "enter_into".to_string()
        }
    );
    assert_eq!(module.matches("@step(\"Enter <value> into <element_id>\")").count(), 1);
    assert!(module.contains(&format!("return {}(", dropdown.name)));
}
