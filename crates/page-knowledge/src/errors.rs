//! Error types for knowledge loading

use specforge_core_types::ForgeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// Document is not valid JSON for the knowledge schema
    #[error("knowledge document parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document parsed but carries unusable content
    #[error("invalid knowledge entry '{key}': {reason}")]
    InvalidEntry { key: String, reason: String },
}

pub type KnowledgeResult<T> = Result<T, KnowledgeError>;

impl From<KnowledgeError> for ForgeError {
    fn from(err: KnowledgeError) -> Self {
        ForgeError::new(err.to_string())
    }
}
