//! Oracle calculator.
//!
//! Computes expected numeric results for scenarios whose entered inputs fully
//! determine a known computation. Today that is the fixed-payment amortization
//! formula used by loan and mortgage calculators.

pub mod amortization;
pub mod format;
pub mod model;
pub mod policy;

pub use amortization::{monthly_payment, Oracle};
pub use format::format_amount;
pub use model::{parse_number, Amount, Compounding, OracleInputs, OracleOutcome, Unavailable};
pub use policy::OraclePolicyView;
