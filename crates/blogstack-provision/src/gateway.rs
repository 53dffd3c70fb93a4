//! HTTP gateway provisioning.

use blogstack_core::{LogicalId, PropValue, ResourceGraph, ResourceNode, ResourceType};

use crate::compute::ComputeHandle;
use crate::error::{ProvisionError, ProvisionResult};

/// One second under the platform's 30-second request ceiling, so the
/// integration fails the request before the platform does.
pub const INTEGRATION_TIMEOUT_SECS: i64 = 29;

/// Custom domain binding for the gateway.
#[derive(Debug, Clone)]
pub struct CustomDomain {
    pub domain_name: String,
    pub certificate_arn: String,
}

/// Alias-record target: the gateway domain's regional endpoint, as deferred
/// attribute reads. Consuming these preserves the domain-before-record
/// ordering without coupling the gateway and DNS composition steps.
#[derive(Debug, Clone)]
pub struct AliasTarget {
    pub dns_name: PropValue,
    pub hosted_zone_id: PropValue,
}

/// Handle to a provisioned gateway.
#[derive(Debug, Clone)]
pub struct GatewayHandle {
    pub api: LogicalId,
    pub domain: Option<LogicalId>,
    pub domain_name: Option<String>,
}

impl GatewayHandle {
    /// Default endpoint URL of the API.
    pub fn api_url(&self) -> PropValue {
        PropValue::attr(self.api.clone(), "url")
    }

    /// Target for a DNS alias record pointing at the custom domain.
    pub fn alias_target(&self) -> ProvisionResult<AliasTarget> {
        let domain = self.domain.clone().ok_or(ProvisionError::NoCustomDomain)?;
        Ok(AliasTarget {
            dns_name: PropValue::attr(domain.clone(), "regionalDomainName"),
            hosted_zone_id: PropValue::attr(domain, "regionalHostedZoneId"),
        })
    }
}

pub struct GatewayProvisioner;

impl GatewayProvisioner {
    /// Provision one HTTP API with a catch-all route into the compute unit,
    /// optionally bound to a custom domain and certificate.
    pub fn provision(
        graph: &mut ResourceGraph,
        stack_name: &str,
        function: &ComputeHandle,
        custom_domain: Option<CustomDomain>,
    ) -> ProvisionResult<GatewayHandle> {
        let api = graph.add(
            ResourceNode::new("HttpApi", ResourceType::HttpApi)
                .prop("api_name", format!("{stack_name}-HttpApi")),
        )?;

        let integration = graph.add(
            ResourceNode::new("HttpLambdaIntegration", ResourceType::HttpIntegration)
                .prop("api_id", PropValue::attr(api.clone(), "id"))
                .prop("function_arn", function.function_arn())
                .prop("timeout_seconds", INTEGRATION_TIMEOUT_SECS),
        )?;

        graph.add(
            ResourceNode::new("ProxyRoute", ResourceType::HttpRoute)
                .prop("api_id", PropValue::attr(api.clone(), "id"))
                .prop("path", "/{proxy+}")
                .prop("methods", PropValue::List(vec![PropValue::from("ANY")]))
                .prop("integration_id", PropValue::attr(integration, "id")),
        )?;

        let (domain, domain_name) = match custom_domain {
            Some(custom) => {
                let domain = graph.add(
                    ResourceNode::new("CustomDomain", ResourceType::ApiDomainName)
                        .prop("domain_name", custom.domain_name.clone())
                        .prop("certificate_arn", custom.certificate_arn),
                )?;

                graph.add(
                    ResourceNode::new("BasePathMapping", ResourceType::ApiMapping)
                        .prop("api_id", PropValue::attr(api.clone(), "id"))
                        .prop("domain_id", PropValue::attr(domain.clone(), "id"))
                        .prop(
                            "stage",
                            PropValue::attr(api.clone(), "defaultStage"),
                        ),
                )?;

                (Some(domain), Some(custom.domain_name))
            }
            None => (None, None),
        };

        Ok(GatewayHandle {
            api,
            domain,
            domain_name,
        })
    }
}
