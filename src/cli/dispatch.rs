use anyhow::Result;

use super::canon::cmd_canon;
use super::compile::cmd_compile;
use super::env::CliArgs;
use super::oracle::cmd_oracle;
use super::templates::cmd_templates;
use crate::cli::commands::Commands;
use crate::cli::context::CliContext;

pub async fn dispatch(cli: &CliArgs, ctx: &CliContext) -> Result<()> {
    match cli.command.clone() {
        Commands::Compile(args) => cmd_compile(args, ctx).await,
        Commands::Canon(args) => cmd_canon(args, ctx),
        Commands::Oracle(args) => cmd_oracle(args, ctx),
        Commands::Templates(args) => cmd_templates(args, ctx).await,
    }
}
