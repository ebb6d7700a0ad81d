use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use crate::artifacts::write_artifacts;
use crate::errors::SpecForgeError;
use crate::pipeline::{load_knowledge, load_scenarios, Pipeline};

use super::context::CliContext;
use super::output::{print_json, OutputFormat};

#[derive(Args, Clone)]
pub struct CompileArgs {
    /// Scenario document (JSON) produced by the scenario generator
    #[arg(long, value_name = "FILE")]
    pub scenarios: PathBuf,

    /// Crawled page knowledge (JSON)
    #[arg(long, value_name = "FILE")]
    pub knowledge: Option<PathBuf>,

    /// Output directory (defaults to the configured output_dir)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// Suite title for the specification header
    #[arg(long)]
    pub title: Option<String>,
}

pub async fn cmd_compile(args: CompileArgs, ctx: &CliContext) -> Result<()> {
    let kb = load_knowledge(args.knowledge.as_deref()).await?;
    let doc = load_scenarios(&args.scenarios).await?;

    let mut config = ctx.config().clone();
    if let Some(title) = args.title {
        config.suite_title = title;
    }
    let out_dir = args.out.unwrap_or_else(|| config.output_dir.clone());
    let names = config.artifacts.clone();

    let task_dir = out_dir.clone();
    let (output, manifest) = tokio::task::spawn_blocking(move || {
        let output = Pipeline::new(config).run(&doc, &kb);
        let manifest = write_artifacts(&task_dir, &names, &output)?;
        Ok::<_, SpecForgeError>((output, manifest))
    })
    .await
    .context("compile task failed")??;

    if ctx.output() == OutputFormat::Json {
        return print_json(&manifest);
    }

    let summary = &output.summary;
    println!(
        "Compiled {} scenario(s) into {}",
        summary.scenarios_emitted,
        out_dir.display()
    );
    for artifact in &manifest.artifacts {
        println!(
            "  {:<16} {:>7} bytes  blake3 {}",
            artifact.file,
            artifact.bytes,
            artifact.blake3.get(..12).unwrap_or(&artifact.blake3)
        );
    }
    println!(
        "  templates: {} ({} stub)",
        summary.templates, summary.stub_bindings
    );
    println!(
        "  input: {} page(s), {} scenario(s); skipped {} page(s), {} scenario(s)",
        summary.compile.pages,
        summary.compile.scenarios_in,
        summary.compile.pages_skipped,
        summary.compile.scenarios_skipped
    );
    println!(
        "  dropped: {} at compile, {} by validation",
        summary.compile.dropped_degenerate, summary.validation.scenarios_deleted
    );
    println!(
        "  steps: {} discarded, {} fallback locator(s), {} case-corrected, {} unknown text dropped, {} search misuse removed",
        summary.compile.steps_discarded,
        summary.compile.fallback_locators,
        summary.validation.steps_case_corrected,
        summary.validation.steps_dropped_unknown_text,
        summary.validation.steps_removed_no_form_fields
    );
    println!("  oracle amounts: {}", summary.compile.oracles_computed);
    println!("  config: {}", ctx.config_path().display());
    Ok(())
}
