use thiserror::Error;

use specforge_core_types::ForgeError;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("scenario document is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("scenario document has unsupported shape: {0}")]
    Shape(String),
}

pub type CompileResult<T> = Result<T, CompileError>;

impl From<CompileError> for ForgeError {
    fn from(value: CompileError) -> Self {
        ForgeError::new(value.to_string())
    }
}
