//! Atomic artifact output.
//!
//! The specification, the bindings and `manifest.json` are written into a
//! staging directory beside the output directory and synced. Each file is then
//! renamed over its counterpart in the output directory, manifest last. Files
//! the tool does not own are left alone; artifacts listed by the previous
//! manifest but no longer produced are removed.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ArtifactNames;
use crate::errors::{SpecForgeError, SpecForgeResult};
use crate::pipeline::{PipelineOutput, RunSummary};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Backups of replaced files live here inside the staging directory.
const BACKUP_DIR: &str = ".previous";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ArtifactDigest {
    pub file: String,
    pub bytes: usize,
    pub blake3: String,
}

/// Run metadata kept out of the artifact bodies.
#[derive(Clone, Debug, Serialize)]
pub struct Manifest {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub tool_version: String,
    pub artifacts: Vec<ArtifactDigest>,
    /// Template text → binding name
    pub templates: IndexMap<String, String>,
    pub summary: RunSummary,
}

/// The part of an earlier manifest needed to know which files it wrote.
#[derive(Debug, Deserialize)]
struct PreviousManifest {
    #[serde(default)]
    artifacts: Vec<ArtifactDigest>,
}

pub fn digest(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

pub fn write_artifacts(
    out_dir: &Path,
    names: &ArtifactNames,
    output: &PipelineOutput,
) -> SpecForgeResult<Manifest> {
    let run_id = Uuid::new_v4();
    let manifest = Manifest {
        run_id,
        generated_at: Utc::now(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        artifacts: vec![
            entry(&names.spec_file, output.spec_text.as_bytes()),
            entry(&names.bindings_file, output.bindings_text.as_bytes()),
        ],
        templates: output.bindings.template_map(),
        summary: output.summary.clone(),
    };
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)?;
    check_names(&[names.spec_file.as_str(), names.bindings_file.as_str()])
        .map_err(|source| SpecForgeError::artifact(out_dir, source))?;

    let staging = sibling(out_dir, "staging", run_id);
    let staged = stage(
        &staging,
        &[
            (names.spec_file.as_str(), output.spec_text.as_bytes()),
            (names.bindings_file.as_str(), output.bindings_text.as_bytes()),
            (MANIFEST_FILE, manifest_bytes.as_slice()),
        ],
    );
    if let Err(source) = staged {
        let _ = fs::remove_dir_all(&staging);
        return Err(SpecForgeError::artifact(&staging, source));
    }

    let owned = [
        names.spec_file.as_str(),
        names.bindings_file.as_str(),
        MANIFEST_FILE,
    ];
    let swapped = swap_in(&staging, out_dir, &owned);
    if let Err(err) = fs::remove_dir_all(&staging) {
        warn!(?err, staging = %staging.display(), "could not remove staging directory");
    }
    swapped.map_err(|source| SpecForgeError::artifact(out_dir, source))?;

    info!(dir = %out_dir.display(), run_id = %run_id, "artifacts written");
    Ok(manifest)
}

fn entry(file: &str, bytes: &[u8]) -> ArtifactDigest {
    ArtifactDigest {
        file: file.to_string(),
        bytes: bytes.len(),
        blake3: digest(bytes),
    }
}

/// `<parent>/.<name>.<label>-<run id>`
fn sibling(out_dir: &Path, label: &str, run_id: Uuid) -> PathBuf {
    let name = out_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "specforge-output".to_string());
    let hidden = format!(".{name}.{label}-{}", run_id.simple());
    match out_dir.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.join(hidden),
        _ => PathBuf::from(hidden),
    }
}

/// Artifact names are relative paths inside the output directory.
fn check_names(names: &[&str]) -> io::Result<()> {
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    seen.insert(MANIFEST_FILE);
    for name in names {
        let path = Path::new(name);
        let plain = !name.is_empty()
            && path
                .components()
                .all(|c| matches!(c, Component::Normal(part) if part != OsStr::new(BACKUP_DIR)));
        if !plain {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("artifact name `{name}` must be a relative path inside the output directory"),
            ));
        }
        if !seen.insert(*name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("artifact name `{name}` is used twice"),
            ));
        }
    }
    Ok(())
}

fn stage(dir: &Path, files: &[(&str, &[u8])]) -> io::Result<()> {
    fs::create_dir_all(dir)?;
    for (name, data) in files {
        write_synced(&dir.join(name), data)?;
    }
    sync_dir(dir);
    Ok(())
}

fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    debug!(path = %path.display(), bytes = data.len(), "staged artifact");
    Ok(())
}

fn sync_dir(dir: &Path) {
    // directories cannot be opened for sync on every platform
    if let Ok(handle) = fs::File::open(dir) {
        let _ = handle.sync_all();
    }
}

/// Files the manifest currently in `out_dir` says an earlier run wrote.
fn previously_owned(out_dir: &Path) -> Vec<String> {
    let Ok(raw) = fs::read(out_dir.join(MANIFEST_FILE)) else {
        return Vec::new();
    };
    match serde_json::from_slice::<PreviousManifest>(&raw) {
        Ok(previous) => previous
            .artifacts
            .into_iter()
            .map(|artifact| artifact.file)
            .filter(|file| check_names(&[file.as_str()]).is_ok())
            .collect(),
        Err(err) => {
            warn!(?err, dir = %out_dir.display(), "ignoring unreadable previous manifest");
            Vec::new()
        }
    }
}

/// Move each staged file over its counterpart in `out_dir`.
///
/// Replaced files are kept under the staging backup directory until every
/// rename succeeded and are put back if one fails.
fn swap_in(staging: &Path, out_dir: &Path, owned: &[&str]) -> io::Result<()> {
    fs::create_dir_all(out_dir)?;
    let stale: Vec<String> = previously_owned(out_dir)
        .into_iter()
        .filter(|file| !owned.contains(&file.as_str()))
        .collect();

    let backups = staging.join(BACKUP_DIR);
    let mut replaced: Vec<(PathBuf, Option<PathBuf>)> = Vec::new();
    for name in owned {
        let target = out_dir.join(name);
        let result = replace_one(&staging.join(name), &target, &backups.join(name));
        match result {
            Ok(backup) => replaced.push((target, backup)),
            Err(err) => {
                restore(&replaced);
                return Err(err);
            }
        }
    }
    sync_dir(out_dir);

    for file in stale {
        let path = out_dir.join(&file);
        match fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale artifact"),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!(?err, path = %path.display(), "could not remove stale artifact"),
        }
    }
    Ok(())
}

fn replace_one(staged: &Path, target: &Path, backup: &Path) -> io::Result<Option<PathBuf>> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    let kept = if target.is_file() {
        if let Some(parent) = backup.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::rename(target, backup)?;
        Some(backup.to_path_buf())
    } else {
        None
    };
    if let Err(err) = fs::rename(staged, target) {
        if let Some(backup) = &kept {
            if let Err(restore) = fs::rename(backup, target) {
                warn!(?restore, target = %target.display(), "could not restore previous artifact");
            }
        }
        return Err(err);
    }
    Ok(kept)
}

fn restore(replaced: &[(PathBuf, Option<PathBuf>)]) {
    for (target, backup) in replaced.iter().rev() {
        let result = match backup {
            Some(backup) => fs::rename(backup, target),
            None => fs::remove_file(target),
        };
        if let Err(err) = result {
            warn!(?err, target = %target.display(), "could not roll back artifact");
        }
    }
}
