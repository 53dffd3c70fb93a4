//! Parameter store abstraction and path convention.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::stage::Stage;
use crate::Result;

/// Which half of the configuration store a key lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterNamespace {
    /// Application secrets and runtime configuration.
    Application,
    /// Infrastructure wiring: domain name, certificate ARN, hosted zone.
    Infrastructure,
}

impl ParameterNamespace {
    /// Full lookup path for a (service, stage, key) triple.
    ///
    /// Application keys live under `/{service}-api/{stage}/{key}`,
    /// infrastructure keys under `/{service}-api-infra/{stage}/{key}`.
    pub fn path(&self, service: &str, stage: Stage, key: &str) -> String {
        match self {
            ParameterNamespace::Application => format!("/{service}-api/{stage}/{key}"),
            ParameterNamespace::Infrastructure => format!("/{service}-api-infra/{stage}/{key}"),
        }
    }

    /// Path prefix for every key of a (service, stage) pair.
    pub fn prefix(&self, service: &str, stage: Stage) -> String {
        match self {
            ParameterNamespace::Application => format!("/{service}-api/{stage}/"),
            ParameterNamespace::Infrastructure => format!("/{service}-api-infra/{stage}/"),
        }
    }
}

/// Read access to the external key-value configuration store.
///
/// Reads happen at synthesis time, never at run time of the deployed
/// service. Backends return `None` for a missing path rather than erroring;
/// the resolver decides that a missing required key is fatal.
#[async_trait]
pub trait ParameterStore: Send + Sync {
    /// Fetch the current value at a path.
    async fn get(&self, path: &str) -> Result<Option<String>>;

    /// List known paths under a prefix.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_convention() {
        assert_eq!(
            ParameterNamespace::Application.path("blog", Stage::Dev, "JWT_SECRET"),
            "/blog-api/dev/JWT_SECRET"
        );
        assert_eq!(
            ParameterNamespace::Infrastructure.path("blog", Stage::Prod, "DOMAIN_NAME"),
            "/blog-api-infra/prod/DOMAIN_NAME"
        );
    }
}
