use anyhow::Result;
use clap::Args;
use serde::Serialize;
use step_canon::{CanonOutcome, Canonicalizer};

use super::context::CliContext;
use super::output::{print_json, OutputFormat};

#[derive(Args, Clone)]
pub struct CanonArgs {
    /// Free-text steps, one per argument
    #[arg(required = true, value_name = "STEP")]
    pub steps: Vec<String>,
}

#[derive(Serialize)]
struct CanonRow {
    input: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    canonical: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    discarded: Option<String>,
}

pub fn cmd_canon(args: CanonArgs, ctx: &CliContext) -> Result<()> {
    let canonicalizer = Canonicalizer::new(ctx.config().compile.canon.clone());
    let rows: Vec<CanonRow> = args
        .steps
        .into_iter()
        .map(|input| {
            let (canonical, discarded) = match canonicalizer.canonicalize_text(&input) {
                CanonOutcome::Canonicalized(step) => (Some(step.render()), None),
                CanonOutcome::Discarded(reason) => (None, Some(reason.to_string())),
            };
            CanonRow {
                input,
                canonical,
                discarded,
            }
        })
        .collect();

    if ctx.output() == OutputFormat::Json {
        return print_json(&rows);
    }
    for row in &rows {
        match (&row.canonical, &row.discarded) {
            (Some(step), _) => println!("{step}"),
            (None, Some(reason)) => println!("# discarded ({reason}): {}", row.input),
            (None, None) => {}
        }
    }
    Ok(())
}
