use std::env;
use std::fs as stdfs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

pub const LOCAL_ENV_PATH: &str = "config/local.env";
pub const LOCAL_CONFIG_PATH: &str = "config/specforge.yaml";

/// Load `KEY=VALUE` lines into the environment without overriding set vars.
pub fn load_local_env_overrides() {
    load_env_file(Path::new(LOCAL_ENV_PATH));
}

pub fn load_env_file(path: &Path) -> usize {
    if !path.exists() {
        return 0;
    }
    let contents = match stdfs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            warn!(path = %path.display(), ?err, "failed to read local.env overrides");
            return 0;
        }
    };

    let mut applied = 0;
    for (idx, raw_line) in contents.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            warn!(line = idx + 1, "invalid local.env entry; skipping");
            continue;
        };
        let key = key.trim();
        if key.is_empty() || env::var(key).is_ok() {
            continue;
        }
        env::set_var(key, unquote(value.trim()));
        applied += 1;
    }
    applied
}

pub fn init_logging(level: &str, debug: bool, json: bool) -> Result<()> {
    let level = if debug {
        tracing::Level::DEBUG
    } else {
        level.parse().context("Invalid log level")?
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level.to_string()));

    // stdout carries command output; logs go to stderr
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .context("logger already initialized")?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .context("logger already initialized")?;
    }
    Ok(())
}

pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
}

pub async fn load_config(config_path: Option<&PathBuf>) -> Result<LoadedConfig> {
    let config_path = match config_path {
        Some(path) => path.clone(),
        None => {
            // ./config/specforge.yaml, then ~/.config/specforge/config.yaml
            let local_config = PathBuf::from(LOCAL_CONFIG_PATH);
            if local_config.exists() {
                local_config
            } else {
                let mut path = dirs::config_dir().context("Failed to get config directory")?;
                path.push("specforge");
                path.push("config.yaml");
                path
            }
        }
    };

    if !config_path.exists() {
        info!(path = %config_path.display(), "config file not found, using defaults");
        return Ok(LoadedConfig {
            config: Config::default(),
            path: config_path,
        });
    }

    let content = fs::read_to_string(&config_path)
        .await
        .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
    let config: Config = serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
    info!(path = %config_path.display(), "loaded configuration");
    Ok(LoadedConfig {
        config,
        path: config_path,
    })
}

fn unquote(value: &str) -> String {
    let quoted = value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')));
    if !quoted {
        return value.to_string();
    }
    value[1..value.len() - 1]
        .replace("\\\"", "\"")
        .replace("\\n", "\n")
        .replace("\\t", "\t")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn unquote_handles_both_quote_styles() {
        assert_eq!(unquote("\"a b\""), "a b");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("plain"), "plain");
        assert_eq!(unquote("\""), "\"");
    }

    #[test]
    #[serial]
    fn env_file_never_overrides_existing_vars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("local.env");
        stdfs::write(
            &path,
            "# comment\nSPECFORGE_TEST_A=\"from file\"\nSPECFORGE_TEST_B=file\nnot a pair\n",
        )
        .unwrap();
        env::set_var("SPECFORGE_TEST_B", "preset");
        env::remove_var("SPECFORGE_TEST_A");

        assert_eq!(load_env_file(&path), 1);
        assert_eq!(env::var("SPECFORGE_TEST_A").unwrap(), "from file");
        assert_eq!(env::var("SPECFORGE_TEST_B").unwrap(), "preset");

        env::remove_var("SPECFORGE_TEST_A");
        env::remove_var("SPECFORGE_TEST_B");
    }

    #[tokio::test]
    async fn missing_config_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yaml");
        let loaded = load_config(Some(&path)).await.unwrap();
        assert_eq!(loaded.path, path);
        assert_eq!(loaded.config.suite_title, Config::default().suite_title);
    }
}
