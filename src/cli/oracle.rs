use anyhow::{bail, Result};
use clap::Args;
use oracle_calc::{Compounding, Oracle, OracleInputs, OracleOutcome};

use super::context::CliContext;
use super::output::{print_json, OutputFormat};

#[derive(Args, Clone)]
pub struct OracleArgs {
    /// Loan principal
    #[arg(long, allow_hyphen_values = true)]
    pub principal: String,

    /// Nominal annual interest rate in percent
    #[arg(long, allow_hyphen_values = true)]
    pub rate: String,

    /// Term in years
    #[arg(long, allow_hyphen_values = true)]
    pub years: String,

    /// Compound annually instead of monthly
    #[arg(long)]
    pub annual: bool,
}

pub fn cmd_oracle(args: OracleArgs, ctx: &CliContext) -> Result<()> {
    let inputs = OracleInputs {
        principal: Some(args.principal),
        rate: Some(args.rate),
        years: Some(args.years),
        compounding: if args.annual {
            Compounding::Annual
        } else {
            Compounding::Monthly
        },
    };
    let outcome = Oracle::new(ctx.config().compile.oracle.clone()).compute(&inputs);

    if ctx.output() == OutputFormat::Json {
        return print_json(&outcome);
    }
    match outcome {
        OracleOutcome::Amount(amount) => {
            println!("{}", amount.formatted);
            Ok(())
        }
        OracleOutcome::Unavailable(reason) => bail!("payment unavailable: {reason}"),
    }
}
