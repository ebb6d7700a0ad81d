use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    #[default]
    Monthly,
    Annual,
}

impl Compounding {
    /// `annually`, `Yearly`, `annual` select annual compounding.
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("annual") || lower.contains("year") {
            Compounding::Annual
        } else {
            Compounding::Monthly
        }
    }
}

/// Raw entered values gathered from a scenario, keyed by role.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleInputs {
    pub principal: Option<String>,
    /// Nominal annual rate as a percentage (`6` means 6%)
    pub rate: Option<String>,
    pub years: Option<String>,
    pub compounding: Compounding,
}

impl OracleInputs {
    pub fn is_empty(&self) -> bool {
        self.principal.is_none() && self.rate.is_none() && self.years.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Amount {
    pub value: f64,
    pub formatted: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "reason", content = "detail")]
pub enum Unavailable {
    Disabled,
    MissingPrincipal,
    MissingRate,
    MissingTerm,
    NonNumeric(String),
    NonFinite(String),
    Negative(String),
    ZeroRate,
    ZeroTerm,
    /// The formula left the range of finite payments
    Overflow,
}

impl fmt::Display for Unavailable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unavailable::Disabled => f.write_str("oracle disabled"),
            Unavailable::MissingPrincipal => f.write_str("principal missing"),
            Unavailable::MissingRate => f.write_str("rate missing"),
            Unavailable::MissingTerm => f.write_str("term missing"),
            Unavailable::NonNumeric(raw) => write!(f, "non-numeric input {raw:?}"),
            Unavailable::NonFinite(raw) => write!(f, "non-finite input {raw:?}"),
            Unavailable::Negative(raw) => write!(f, "negative input {raw:?}"),
            Unavailable::ZeroRate => f.write_str("zero rate"),
            Unavailable::ZeroTerm => f.write_str("zero term"),
            Unavailable::Overflow => f.write_str("payment out of range"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleOutcome {
    Amount(Amount),
    Unavailable(Unavailable),
}

impl OracleOutcome {
    pub fn amount(&self) -> Option<&Amount> {
        match self {
            OracleOutcome::Amount(amount) => Some(amount),
            OracleOutcome::Unavailable(_) => None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.amount().is_some()
    }
}

/// Parse an entered number, tolerating currency symbols, `%`, `,` and spaces.
pub fn parse_number(raw: &str) -> Result<f64, Unavailable> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '%' | ',') && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Err(Unavailable::NonNumeric(raw.to_string()));
    }
    let value: f64 = cleaned
        .parse()
        .map_err(|_| Unavailable::NonNumeric(raw.to_string()))?;
    if !value.is_finite() {
        return Err(Unavailable::NonFinite(raw.to_string()));
    }
    if value < 0.0 {
        return Err(Unavailable::Negative(raw.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_decorated_numbers() {
        assert_eq!(parse_number("$100,000"), Ok(100000.0));
        assert_eq!(parse_number(" 6.5 % "), Ok(6.5));
        assert_eq!(parse_number("0"), Ok(0.0));
    }

    #[test]
    fn rejects_unusable_numbers() {
        assert!(matches!(parse_number("30 years"), Err(Unavailable::NonNumeric(_))));
        assert!(matches!(parse_number("abc"), Err(Unavailable::NonNumeric(_))));
        assert!(matches!(parse_number("$"), Err(Unavailable::NonNumeric(_))));
        assert!(matches!(parse_number("-5"), Err(Unavailable::Negative(_))));
        assert!(matches!(parse_number("inf"), Err(Unavailable::NonFinite(_))));
        assert!(matches!(parse_number("NaN"), Err(Unavailable::NonFinite(_))));
    }

    #[test]
    fn compounding_labels() {
        assert_eq!(Compounding::from_label("Annually (APY)"), Compounding::Annual);
        assert_eq!(Compounding::from_label("yearly"), Compounding::Annual);
        assert_eq!(Compounding::from_label("Monthly (APR)"), Compounding::Monthly);
    }
}
