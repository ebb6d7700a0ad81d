//! Errors at the pipeline's I/O boundaries.
//!
//! Per-scenario problems are outcomes inside the compiled batch, never errors.

use std::io;
use std::path::PathBuf;

use page_knowledge::KnowledgeError;
use spec_compiler::CompileError;
use specforge_core_types::ForgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpecForgeError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid knowledge base {path}: {source}")]
    Knowledge {
        path: PathBuf,
        #[source]
        source: KnowledgeError,
    },

    #[error("invalid scenario document {path}: {source}")]
    Scenarios {
        path: PathBuf,
        #[source]
        source: CompileError,
    },

    #[error("failed to write artifacts under {path}: {source}")]
    Artifact {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode manifest: {0}")]
    Manifest(#[from] serde_json::Error),
}

impl SpecForgeError {
    pub fn artifact(path: impl Into<PathBuf>, source: io::Error) -> Self {
        SpecForgeError::Artifact {
            path: path.into(),
            source,
        }
    }
}

impl From<SpecForgeError> for ForgeError {
    fn from(err: SpecForgeError) -> Self {
        ForgeError::new(err.to_string())
    }
}

pub type SpecForgeResult<T> = Result<T, SpecForgeError>;
