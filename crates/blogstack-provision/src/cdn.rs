//! Content delivery provisioning.
//!
//! Two distribution variants: fronting the compute unit's public invocation
//! URL, or fronting a storage bucket. Both restrict origin access through an
//! origin access control.

use std::collections::BTreeMap;

use blogstack_core::{
    DeletionPolicy, LogicalId, PropValue, ResourceGraph, ResourceNode, ResourceType,
};

use crate::compute::ComputeHandle;
use crate::error::{ProvisionError, ProvisionResult};
use crate::storage::StorageHandle;

// Managed cache policy TTLs (seconds).
const CACHE_MIN_TTL: i64 = 1;
const CACHE_DEFAULT_TTL: i64 = 86_400;
const CACHE_MAX_TTL: i64 = 31_536_000;

/// Handle to a provisioned distribution.
#[derive(Debug, Clone)]
pub struct CdnHandle {
    pub distribution: LogicalId,
}

impl CdnHandle {
    pub fn domain_name(&self) -> PropValue {
        PropValue::attr(self.distribution.clone(), "domainName")
    }
}

/// Distribution fronting the compute unit's public invocation URL.
pub struct FunctionCdn;

impl FunctionCdn {
    pub fn provision(
        graph: &mut ResourceGraph,
        compute: &ComputeHandle,
    ) -> ProvisionResult<CdnHandle> {
        let function_url = compute
            .function_url
            .clone()
            .ok_or(ProvisionError::NoFunctionUrl)?;

        let oac = graph.add(
            ResourceNode::new("FunctionOriginAccessControl", ResourceType::OriginAccessControl)
                .prop("name", "AllowCloudFrontOAC")
                .prop("origin_type", "lambda")
                .prop("signing", "sigv4-always"),
        )?;

        let distribution = graph.add(
            ResourceNode::new("Distribution", ResourceType::CloudFrontDistribution)
                .prop(
                    "origin",
                    PropValue::Map(BTreeMap::from([
                        (
                            "domain_name".to_string(),
                            PropValue::attr(function_url, "domain"),
                        ),
                        (
                            "origin_access_control_id".to_string(),
                            PropValue::attr(oac, "id"),
                        ),
                    ])),
                )
                .prop(
                    "default_behavior",
                    PropValue::Map(BTreeMap::from([
                        ("allowed_methods".to_string(), PropValue::from("all")),
                        (
                            "viewer_protocol_policy".to_string(),
                            PropValue::from("redirect-to-https"),
                        ),
                    ])),
                ),
        )?;

        // The invoke permission is scoped to the distribution's own ARN, so
        // it can only be attached after the distribution exists; the
        // attribute read carries that ordering.
        graph.add(
            ResourceNode::new("InvokeByCloudFront", ResourceType::LambdaPermission)
                .prop("function_arn", compute.function_arn())
                .prop("action", "lambda:InvokeFunctionUrl")
                .prop("principal", "cloudfront.amazonaws.com")
                .prop("source_arn", PropValue::attr(distribution.clone(), "arn")),
        )?;

        Ok(CdnHandle { distribution })
    }
}

/// Distribution fronting a storage bucket: read-only methods, compression
/// on, managed-style cache and CORS origin-request policies.
pub struct BucketCdn;

impl BucketCdn {
    pub fn provision(
        graph: &mut ResourceGraph,
        bucket: &StorageHandle,
        deletion_policy: DeletionPolicy,
    ) -> ProvisionResult<CdnHandle> {
        let cache_policy = graph.add(
            ResourceNode::new("CachePolicy", ResourceType::CachePolicy)
                .prop("name", "Managed-CachingOptimized")
                .prop("min_ttl", CACHE_MIN_TTL)
                .prop("default_ttl", CACHE_DEFAULT_TTL)
                .prop("max_ttl", CACHE_MAX_TTL)
                .prop("accept_encoding_gzip", true)
                .prop("accept_encoding_brotli", true)
                .deletion_policy(deletion_policy),
        )?;

        let origin_request_policy = graph.add(
            ResourceNode::new("OriginRequestPolicy", ResourceType::OriginRequestPolicy)
                .prop("name", "Managed-CORS-S3Origin")
                .prop(
                    "headers",
                    PropValue::List(vec![
                        PropValue::from("origin"),
                        PropValue::from("access-control-request-headers"),
                        PropValue::from("access-control-request-method"),
                    ]),
                )
                .deletion_policy(deletion_policy),
        )?;

        let oac = graph.add(
            ResourceNode::new("OriginAccessControl", ResourceType::OriginAccessControl)
                .prop("name", bucket.regional_domain())
                .prop("origin_type", "s3")
                .prop("signing", "sigv4-always")
                .deletion_policy(deletion_policy),
        )?;

        let distribution = graph.add(
            ResourceNode::new("Distribution", ResourceType::CloudFrontDistribution)
                .prop(
                    "origin",
                    PropValue::Map(BTreeMap::from([
                        ("domain_name".to_string(), bucket.regional_domain()),
                        (
                            "origin_access_control_id".to_string(),
                            PropValue::attr(oac, "id"),
                        ),
                    ])),
                )
                .prop(
                    "default_behavior",
                    PropValue::Map(BTreeMap::from([
                        (
                            "allowed_methods".to_string(),
                            PropValue::List(vec![PropValue::from("HEAD"), PropValue::from("GET")]),
                        ),
                        (
                            "cached_methods".to_string(),
                            PropValue::List(vec![PropValue::from("HEAD"), PropValue::from("GET")]),
                        ),
                        ("compress".to_string(), PropValue::from(true)),
                        (
                            "cache_policy_id".to_string(),
                            PropValue::attr(cache_policy, "id"),
                        ),
                        (
                            "origin_request_policy_id".to_string(),
                            PropValue::attr(origin_request_policy, "id"),
                        ),
                        (
                            "viewer_protocol_policy".to_string(),
                            PropValue::from("redirect-to-https"),
                        ),
                    ])),
                )
                .deletion_policy(deletion_policy),
        )?;

        // Content prefixes stay readable only through the distribution.
        if let Some(bucket_id) = &bucket.bucket {
            graph.add(
                ResourceNode::new("ContentsBucketPolicy", ResourceType::S3BucketPolicy)
                    .prop("bucket", PropValue::attr(bucket_id.clone(), "name"))
                    .prop(
                        "resources",
                        PropValue::List(vec![
                            PropValue::from(format!("{}/thumbnail/*", bucket.arn())),
                            PropValue::from(format!("{}/content/*", bucket.arn())),
                        ]),
                    )
                    .prop("actions", PropValue::List(vec![PropValue::from("s3:GetObject")]))
                    .prop("principal", "cloudfront.amazonaws.com")
                    .prop(
                        "source_arn",
                        PropValue::attr(distribution.clone(), "arn"),
                    )
                    .deletion_policy(deletion_policy),
            )?;
        }

        Ok(CdnHandle { distribution })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::StorageProvisioner;

    fn compute_with_url(graph: &mut ResourceGraph) -> ComputeHandle {
        graph
            .add(ResourceNode::new(
                "DockerImageFunction",
                ResourceType::LambdaFunction,
            ))
            .unwrap();
        let url = graph
            .add(ResourceNode::new(
                "FunctionUrl",
                ResourceType::LambdaFunctionUrl,
            ))
            .unwrap();
        ComputeHandle {
            function: "DockerImageFunction".into(),
            role: "FunctionRole".into(),
            image_push: None,
            function_url: Some(url),
            environment: BTreeMap::new(),
        }
    }

    #[test]
    fn test_invoke_permission_attaches_after_distribution() {
        let mut graph = ResourceGraph::new();
        let compute = compute_with_url(&mut graph);
        let cdn = FunctionCdn::provision(&mut graph, &compute).unwrap();

        assert!(graph.has_edge(&"InvokeByCloudFront".into(), &cdn.distribution));

        let order = graph.apply_order().unwrap();
        let pos = |name: &str| order.iter().position(|x| x.as_str() == name).unwrap();
        assert!(pos("Distribution") < pos("InvokeByCloudFront"));
    }

    #[test]
    fn test_function_cdn_requires_public_url() {
        let mut graph = ResourceGraph::new();
        let mut compute = compute_with_url(&mut graph);
        compute.function_url = None;

        assert!(matches!(
            FunctionCdn::provision(&mut graph, &compute),
            Err(ProvisionError::NoFunctionUrl)
        ));
    }

    #[test]
    fn test_bucket_cdn_is_read_only_and_retainable() {
        let mut graph = ResourceGraph::new();
        let bucket =
            StorageProvisioner::provision(&mut graph, "blog-contents", DeletionPolicy::Retain)
                .unwrap();
        BucketCdn::provision(&mut graph, &bucket, DeletionPolicy::Retain).unwrap();

        let distribution = graph.get(&"Distribution".into()).unwrap();
        assert_eq!(distribution.deletion_policy, DeletionPolicy::Retain);

        let PropValue::Map(behavior) = &distribution.properties["default_behavior"] else {
            panic!("expected behavior map");
        };
        assert_eq!(
            behavior["allowed_methods"],
            PropValue::List(vec![PropValue::from("HEAD"), PropValue::from("GET")])
        );
        assert_eq!(behavior["compress"], PropValue::from(true));
    }

    #[test]
    fn test_bucket_policy_scoped_to_content_prefixes() {
        let mut graph = ResourceGraph::new();
        let bucket =
            StorageProvisioner::provision(&mut graph, "blog-contents", DeletionPolicy::Delete)
                .unwrap();
        BucketCdn::provision(&mut graph, &bucket, DeletionPolicy::Delete).unwrap();

        let policy = graph.get(&"ContentsBucketPolicy".into()).unwrap();
        assert_eq!(
            policy.properties["resources"],
            PropValue::List(vec![
                PropValue::from("arn:aws:s3:::blog-contents/thumbnail/*"),
                PropValue::from("arn:aws:s3:::blog-contents/content/*"),
            ])
        );
    }
}
