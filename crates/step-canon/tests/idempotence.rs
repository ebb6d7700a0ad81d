use step_canon::{CanonOutcome, CanonicalStep, Canonicalizer, RawStep};

const AUTHORED: &[&str] = &[
    "Navigate to /loan-calculator.html",
    "Enter loan amount 100000",
    "Type '6' into 'interest rate'",
    "Select compounding annually",
    "Click the Calculate button",
    "Clear the loan amount field",
    "Verify the page contains 'Sign In'",
    "Check the monthly payment is $599.55",
    "Ensure that result is displayed",
    "Verify no valid result for -5",
    "verify \"6\" in \"interest rate\"",
    "Go back to /",
];

fn once(canon: &Canonicalizer, text: &str) -> Option<String> {
    canon
        .canonicalize(&RawStep::text(text))
        .into_step()
        .map(|step| step.render())
}

#[test]
fn canonical_output_is_a_fixed_point() {
    let canon = Canonicalizer::default();
    for authored in AUTHORED {
        let first = once(&canon, authored).unwrap_or_else(|| panic!("discarded: {authored}"));
        let second = once(&canon, &first).unwrap_or_else(|| panic!("lost on re-canon: {first}"));
        assert_eq!(first, second, "not idempotent for {authored}");
    }
}

#[test]
fn values_that_sanitize_away_settle_on_the_first_pass() {
    let canon = Canonicalizer::default();
    let first = once(&canon, "Enter \"<>\" into \"x\"").expect("kept as a clear");
    assert_eq!(first, "Clear \"x\"");
    assert_eq!(once(&canon, &first).as_deref(), Some(first.as_str()));

    assert_eq!(once(&canon, "Select \"<>\" in \"ccompound\""), None);
    assert_eq!(once(&canon, "Verify \"<>\" in \"cloanamount\""), None);
}

#[test]
fn canonical_strings_round_trip_through_parse() {
    let canon = Canonicalizer::default();
    for authored in AUTHORED {
        let rendered = once(&canon, authored).unwrap();
        let parsed: CanonicalStep = rendered.parse().expect("canonical output parses");
        assert_eq!(parsed.render(), rendered);
    }
}

#[test]
fn literals_never_carry_quotes_or_angle_brackets() {
    let canon = Canonicalizer::default();
    let outcome = canon.canonicalize(&RawStep::text("Verify page contains <b>\"Total\"</b>"));
    match outcome {
        CanonOutcome::Canonicalized(step) => {
            assert!(!step.target.contains('"'));
            assert!(!step.target.contains('<'));
        }
        CanonOutcome::Discarded(reason) => panic!("unexpected discard: {reason}"),
    }
}

#[test]
fn mixed_input_document_discards_only_bad_steps() {
    let steps: Vec<RawStep> = serde_json::from_str(
        r#"[
            "Navigate to /",
            {"action": "click", "target": "Sign In"},
            {"action": "teleport"},
            null,
            "Enter search term loan"
        ]"#,
    )
    .unwrap();
    let canon = Canonicalizer::default();
    let kept: Vec<String> = steps
        .iter()
        .filter_map(|raw| canon.canonicalize(raw).into_step())
        .map(|step| step.render())
        .collect();
    assert_eq!(
        kept,
        vec![
            "Navigate to \"/\"".to_string(),
            "Click \"Sign In\"".to_string(),
            "Enter \"loan\" into \"search term\"".to_string(),
        ]
    );
}
