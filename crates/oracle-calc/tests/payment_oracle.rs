use oracle_calc::{Compounding, Oracle, OracleInputs, OracleOutcome};

fn loan(compounding: Compounding) -> OracleInputs {
    OracleInputs {
        principal: Some("100000".to_string()),
        rate: Some("6".to_string()),
        years: Some("30".to_string()),
        compounding,
    }
}

#[test]
fn monthly_and_annual_amounts() {
    let oracle = Oracle::default();
    let monthly = oracle.compute(&loan(Compounding::Monthly));
    let annual = oracle.compute(&loan(Compounding::Annual));

    let monthly = monthly.amount().expect("monthly available");
    let annual = annual.amount().expect("annual available");
    assert!((monthly.value - 599.55).abs() <= 0.01);
    assert_ne!(monthly.formatted, annual.formatted);
}

#[test]
fn larger_loans_are_grouped() {
    let oracle = Oracle::default();
    let outcome = oracle.compute(&OracleInputs {
        principal: Some("$350,000".into()),
        rate: Some("7.5".into()),
        years: Some("30".into()),
        compounding: Compounding::Monthly,
    });
    match outcome {
        OracleOutcome::Amount(amount) => {
            assert_eq!(amount.formatted, "$2,447.25");
        }
        OracleOutcome::Unavailable(reason) => panic!("unexpected: {reason}"),
    }
}
