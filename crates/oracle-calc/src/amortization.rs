//! Fixed-payment amortization

use tracing::debug;

use crate::format::format_amount;
use crate::model::{parse_number, Amount, Compounding, OracleInputs, OracleOutcome, Unavailable};
use crate::policy::OraclePolicyView;

/// Monthly payment for `principal` at `annual_rate_pct` over `years`.
///
/// Monthly compounding uses `r = annual / 12`; annual compounding uses the
/// effective monthly rate `(1 + annual)^(1/12) - 1`. Returns `None` when the
/// formula is undefined (`r == 0` or `n == 0`) or the result is not finite.
pub fn monthly_payment(
    principal: f64,
    annual_rate_pct: f64,
    years: f64,
    compounding: Compounding,
) -> Option<f64> {
    let annual = annual_rate_pct / 100.0;
    let r = match compounding {
        Compounding::Monthly => annual / 12.0,
        Compounding::Annual => (1.0 + annual).powf(1.0 / 12.0) - 1.0,
    };
    let n = (years * 12.0).round();
    if r == 0.0 || n == 0.0 {
        return None;
    }
    let growth = (1.0 + r).powf(n);
    let payment = principal * r * growth / (growth - 1.0);
    payment.is_finite().then_some(payment)
}

#[derive(Clone, Debug, Default)]
pub struct Oracle {
    policy: OraclePolicyView,
}

impl Oracle {
    pub fn new(policy: OraclePolicyView) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &OraclePolicyView {
        &self.policy
    }

    pub fn compute(&self, inputs: &OracleInputs) -> OracleOutcome {
        match self.try_compute(inputs) {
            Ok(amount) => OracleOutcome::Amount(amount),
            Err(reason) => {
                debug!(%reason, "oracle unavailable");
                OracleOutcome::Unavailable(reason)
            }
        }
    }

    fn try_compute(&self, inputs: &OracleInputs) -> Result<Amount, Unavailable> {
        if !self.policy.enabled {
            return Err(Unavailable::Disabled);
        }
        let principal = parse_number(
            inputs
                .principal
                .as_deref()
                .ok_or(Unavailable::MissingPrincipal)?,
        )?;
        let rate = parse_number(inputs.rate.as_deref().ok_or(Unavailable::MissingRate)?)?;
        let years = parse_number(inputs.years.as_deref().ok_or(Unavailable::MissingTerm)?)?;
        if rate == 0.0 {
            return Err(Unavailable::ZeroRate);
        }
        if (years * 12.0).round() == 0.0 {
            return Err(Unavailable::ZeroTerm);
        }
        let value = monthly_payment(principal, rate, years, inputs.compounding)
            .ok_or(Unavailable::Overflow)?;
        let value = (value * 100.0).round() / 100.0;
        Ok(Amount {
            value,
            formatted: format_amount(value, &self.policy),
        })
    }
}
