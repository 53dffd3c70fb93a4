//! Error types for blogstack.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid stage '{0}' (expected 'dev' or 'prod')")]
    InvalidStage(String),

    #[error("duplicate resource: {0}")]
    DuplicateResource(String),

    #[error("unknown resource reference: {from} -> {to}")]
    UnknownReference { from: String, to: String },

    #[error("dependency cycle involving: {0}")]
    DependencyCycle(String),

    #[error("unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("parameter store: {0}")]
    Store(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
