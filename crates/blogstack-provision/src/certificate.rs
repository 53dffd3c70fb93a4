//! TLS certificate resolution.

use blogstack_core::{ParameterNamespace, Stage};
use blogstack_params::ParameterResolver;

use crate::error::ProvisionResult;

pub const CERTIFICATE_ARN_KEY: &str = "ACM_CERTIFICATE_ARN";

/// Reference to an existing certificate. Nothing is created; the gateway's
/// custom domain binds against the resolved ARN.
#[derive(Debug, Clone)]
pub struct CertificateRef {
    pub arn: String,
}

pub struct CertificateProvisioner;

impl CertificateProvisioner {
    /// Resolve the stage's certificate from the infrastructure namespace.
    /// A missing or empty ARN is fatal before any resource is touched.
    pub async fn resolve(
        resolver: &ParameterResolver,
        stage: Stage,
    ) -> ProvisionResult<CertificateRef> {
        let arn = resolver
            .resolve(ParameterNamespace::Infrastructure, stage, CERTIFICATE_ARN_KEY)
            .await?;
        Ok(CertificateRef { arn })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogstack_params::MemoryParameterStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_certificate_resolved_from_infra_namespace() {
        let store = MemoryParameterStore::new().with(
            "/blog-api-infra/prod/ACM_CERTIFICATE_ARN",
            "arn:aws:acm:ap-northeast-1:123456789012:certificate/abc",
        );
        let resolver = ParameterResolver::new(Arc::new(store), "blog");

        let cert = CertificateProvisioner::resolve(&resolver, Stage::Prod)
            .await
            .unwrap();
        assert!(cert.arn.starts_with("arn:aws:acm:"));
    }

    #[tokio::test]
    async fn test_unresolvable_certificate_is_fatal() {
        let resolver = ParameterResolver::new(Arc::new(MemoryParameterStore::new()), "blog");
        assert!(CertificateProvisioner::resolve(&resolver, Stage::Dev)
            .await
            .is_err());
    }
}
