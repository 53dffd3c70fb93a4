//! Provisioning errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Core(#[from] blogstack_core::Error),

    #[error(transparent)]
    Parameter(#[from] blogstack_params::ParamError),

    #[error("gateway has no custom domain to alias")]
    NoCustomDomain,

    #[error("compute unit has no public invocation URL")]
    NoFunctionUrl,
}

pub type ProvisionResult<T> = std::result::Result<T, ProvisionError>;
