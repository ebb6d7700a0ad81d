use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};

use super::context::CliContext;
use super::dispatch::dispatch;
use super::env::CliArgs;
use super::runtime::{init_logging, load_config, load_local_env_overrides, LoadedConfig};

pub async fn run() -> Result<()> {
    load_local_env_overrides();
    let cli = CliArgs::parse();

    init_logging(&cli.log_level, cli.debug, cli.log_json)?;
    debug!(
        version = env!("CARGO_PKG_VERSION"),
        git = env!("SPECFORGE_GIT_HASH"),
        "starting specforge"
    );

    let LoadedConfig { mut config, path } = load_config(cli.config.as_ref()).await?;
    config.apply_env_overrides();
    let ctx = CliContext::new(config, path, cli.output);

    dispatch(&cli, &ctx).await.map_err(|err| {
        error!("command failed: {err:#}");
        err
    })
}
