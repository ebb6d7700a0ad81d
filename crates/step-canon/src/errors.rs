use thiserror::Error;

use specforge_core_types::ForgeError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CanonError {
    #[error("not a canonical step: {input}")]
    NotCanonical { input: String },
}

pub type CanonResult<T> = Result<T, CanonError>;

impl From<CanonError> for ForgeError {
    fn from(value: CanonError) -> Self {
        ForgeError::new(value.to_string())
    }
}
