//! Parameter resolution errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("missing parameter: {0}")]
    Missing(String),

    #[error("empty parameter: {0}")]
    Empty(String),

    #[error("unresolved parameters: {}", .0.join(", "))]
    Unresolved(Vec<String>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed parameter file: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] blogstack_core::Error),
}

pub type ParamResult<T> = std::result::Result<T, ParamError>;
