use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::pipeline::{load_knowledge, load_scenarios, Pipeline};

use super::context::CliContext;
use super::output::{print_json, OutputFormat};

#[derive(Args, Clone)]
pub struct TemplatesArgs {
    /// Scenario document (JSON)
    #[arg(long, value_name = "FILE")]
    pub scenarios: PathBuf,

    /// Crawled page knowledge (JSON)
    #[arg(long, value_name = "FILE")]
    pub knowledge: Option<PathBuf>,
}

pub async fn cmd_templates(args: TemplatesArgs, ctx: &CliContext) -> Result<()> {
    let kb = load_knowledge(args.knowledge.as_deref()).await?;
    let doc = load_scenarios(&args.scenarios).await?;
    let output = Pipeline::new(ctx.config().clone()).run(&doc, &kb);

    if ctx.output() == OutputFormat::Json {
        return print_json(&output.bindings.bindings());
    }
    for binding in output.bindings.bindings() {
        let source = if binding.is_stub() { "stub" } else { "pattern" };
        println!(
            "{:<8} {:<28} {:>4}  {}",
            source,
            binding.name,
            binding.uses,
            binding.template.text()
        );
    }
    Ok(())
}
