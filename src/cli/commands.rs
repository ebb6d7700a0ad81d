use clap::Subcommand;

use super::canon::CanonArgs;
use super::compile::CompileArgs;
use super::oracle::OracleArgs;
use super::templates::TemplatesArgs;

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// Compile a scenario document into a specification and step bindings
    Compile(CompileArgs),

    /// Canonicalize free-text steps and show the outcome of each
    Canon(CanonArgs),

    /// Compute the expected fixed payment for a loan
    Oracle(OracleArgs),

    /// List the step templates a scenario document would need
    Templates(TemplatesArgs),
}
