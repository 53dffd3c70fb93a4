//! Compute provisioning: execution role, environment assembly, and the
//! container-image function.

use std::collections::BTreeMap;

use blogstack_core::{
    LogicalId, ParameterNamespace, PropValue, ResourceGraph, ResourceNode, ResourceType, Stage,
    UnknownValuePolicy,
};
use blogstack_params::ParameterResolver;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ProvisionResult;
use crate::registry::RegistryHandle;

/// The port the web adapter in front of the function listens on. Pinned at
/// synthesis time regardless of what the parameter store says for this key.
pub const APP_PORT_KEY: &str = "BLOG_APP_PORT";
pub const APP_PORT_VALUE: &str = "3000";

/// Application environment keys injected into the compute unit, resolved
/// from the application namespace all-or-nothing.
pub const ENV_KEYS: [&str; 24] = [
    "BLOG_ENV",
    "BLOG_LOG_LEVEL",
    "BLOG_DB_HOST",
    "BLOG_DB_PORT",
    "BLOG_DB_USER",
    "BLOG_DB_PASS",
    "BLOG_DB_NAME",
    "BLOG_DB_TLS_ENABLED",
    "BLOG_KVS_HOST",
    "BLOG_KVS_PORT",
    "BLOG_KVS_USER",
    "BLOG_KVS_PASS",
    "BLOG_KVS_TLS_ENABLED",
    "BLOG_AWS_S3_BUCKET",
    "BLOG_AWS_S3_THUMBNAIL_DIRECTORY",
    "BLOG_AWS_S3_CONTENT_IMAGE_DIRECTORY",
    "ADMIN_NAME",
    "ADMIN_EMAIL",
    "ADMIN_PASSWORD",
    "JWT_SECRET",
    "SITE_DOMAIN",
    "CORS_WHITE_LIST",
    "CDN_DOMAIN",
    "GITHUB_PERSONAL_ACCESS_TOKEN",
];

/// Target architecture of the deployed function image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetArch {
    Arm64,
    X86_64,
}

impl TargetArch {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetArch::Arm64 => "arm64",
            TargetArch::X86_64 => "x86_64",
        }
    }

    /// Map a host architecture string to a target architecture.
    ///
    /// Only arm64 and x86_64 are recognized; anything else is resolved by
    /// the named policy (fallback to x86_64, or fail).
    pub fn from_host(host: &str, policy: UnknownValuePolicy) -> ProvisionResult<Self> {
        match host {
            "aarch64" | "arm64" => Ok(TargetArch::Arm64),
            "x86_64" | "amd64" => Ok(TargetArch::X86_64),
            other => match policy {
                UnknownValuePolicy::FallbackDefault => {
                    warn!(host = other, "unrecognized host architecture, using x86_64");
                    Ok(TargetArch::X86_64)
                }
                UnknownValuePolicy::FailClosed => {
                    Err(blogstack_core::Error::UnsupportedArchitecture(other.to_string()).into())
                }
            },
        }
    }

    /// Target architecture for the machine running this synthesis.
    pub fn detect(policy: UnknownValuePolicy) -> ProvisionResult<Self> {
        Self::from_host(std::env::consts::ARCH, policy)
    }
}

impl std::fmt::Display for TargetArch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs for one compute unit.
#[derive(Debug)]
pub struct ComputeSpec<'a> {
    pub stage: Stage,
    /// Bucket the content-access policy is scoped to.
    pub contents_bucket_arn: String,
    /// Registry-backed image; `None` builds from a local image asset.
    pub registry: Option<&'a RegistryHandle>,
    pub image_tag: String,
    pub architecture: TargetArch,
    pub timeout_seconds: u64,
    /// Also expose a public invocation URL.
    pub public_url: bool,
}

/// Handle to a provisioned compute unit.
#[derive(Debug, Clone)]
pub struct ComputeHandle {
    pub function: LogicalId,
    pub role: LogicalId,
    pub image_push: Option<LogicalId>,
    pub function_url: Option<LogicalId>,
    /// The environment injected into the function, post-override.
    pub environment: BTreeMap<String, String>,
}

impl ComputeHandle {
    pub fn function_arn(&self) -> PropValue {
        PropValue::attr(self.function.clone(), "arn")
    }

    pub fn log_group_name(&self) -> PropValue {
        PropValue::attr(self.function.clone(), "logGroupName")
    }

    /// Public invocation URL, when the public-URL variant was provisioned.
    pub fn invoke_url(&self) -> Option<PropValue> {
        self.function_url
            .as_ref()
            .map(|url| PropValue::attr(url.clone(), "url"))
    }
}

pub struct ComputeProvisioner;

impl ComputeProvisioner {
    /// Provision the execution role, the image publish step, and the
    /// function itself.
    ///
    /// Environment assembly is all-or-nothing: any unresolved key aborts
    /// before a single node is added. The function carries an explicit edge
    /// on the image push so it never references a tag that has not been
    /// published yet.
    pub async fn provision(
        graph: &mut ResourceGraph,
        resolver: &ParameterResolver,
        spec: ComputeSpec<'_>,
    ) -> ProvisionResult<ComputeHandle> {
        let mut environment = resolver
            .resolve_all(ParameterNamespace::Application, spec.stage, &ENV_KEYS)
            .await?;
        // The adapter layer expects this exact port; the resolved value for
        // this key, if any, is overridden.
        environment.insert(APP_PORT_KEY.to_string(), APP_PORT_VALUE.to_string());

        let role = graph.add(
            ResourceNode::new("FunctionRole", ResourceType::IamRole)
                .prop("assumed_by", "lambda.amazonaws.com")
                .prop(
                    "policies",
                    PropValue::Map(BTreeMap::from([
                        (
                            "s3".to_string(),
                            policy_statement(
                                &["s3:GetObject", "s3:PutObject"],
                                &[&spec.contents_bucket_arn],
                            ),
                        ),
                        (
                            "cloudwatch_logs".to_string(),
                            policy_statement(
                                &[
                                    "logs:CreateLogGroup",
                                    "logs:CreateLogStream",
                                    "logs:PutLogEvents",
                                ],
                                &["*"],
                            ),
                        ),
                    ])),
                ),
        )?;

        let (image_push, code) = match spec.registry {
            Some(registry) => {
                let push = graph.add(
                    ResourceNode::new("ImagePush", ResourceType::ImagePush)
                        .prop(
                            "repository_uri",
                            PropValue::attr(registry.repository.clone(), "repositoryUri"),
                        )
                        .prop("tag", spec.image_tag.clone()),
                )?;
                let code = PropValue::Map(BTreeMap::from([(
                    "image_uri".to_string(),
                    PropValue::attr(push.clone(), "imageUri"),
                )]));
                (Some(push), code)
            }
            None => {
                // Local image asset build, published to a synthesis-managed
                // registry by the apply engine.
                let code = PropValue::Map(BTreeMap::from([
                    ("image_asset".to_string(), PropValue::from("../")),
                    (
                        "platform".to_string(),
                        PropValue::from(format!("linux/{}", spec.architecture)),
                    ),
                    (
                        "build_args".to_string(),
                        PropValue::Map(BTreeMap::from([(
                            "PORT".to_string(),
                            PropValue::from(APP_PORT_VALUE),
                        )])),
                    ),
                ]));
                (None, code)
            }
        };

        let mut function = ResourceNode::new("DockerImageFunction", ResourceType::LambdaFunction)
            .prop("architecture", spec.architecture.as_str())
            .prop("timeout_seconds", spec.timeout_seconds as i64)
            .prop("role_arn", PropValue::attr(role.clone(), "arn"))
            .prop("code", code)
            .prop(
                "environment",
                environment
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<PropValue>(),
            );
        if let Some(push) = &image_push {
            function = function.depends_on(push.clone());
        }
        let function = graph.add(function)?;

        let function_url = if spec.public_url {
            Some(graph.add(
                ResourceNode::new("FunctionUrl", ResourceType::LambdaFunctionUrl)
                    .prop("function_arn", PropValue::attr(function.clone(), "arn"))
                    .prop("auth_type", "NONE"),
            )?)
        } else {
            None
        };

        Ok(ComputeHandle {
            function,
            role,
            image_push,
            function_url,
            environment,
        })
    }
}

fn policy_statement(actions: &[&str], resources: &[&str]) -> PropValue {
    PropValue::Map(BTreeMap::from([
        (
            "actions".to_string(),
            PropValue::List(actions.iter().map(|a| PropValue::from(*a)).collect()),
        ),
        (
            "resources".to_string(),
            PropValue::List(resources.iter().map(|r| PropValue::from(*r)).collect()),
        ),
    ]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ContainerRegistry;
    use blogstack_params::{MemoryParameterStore, ParamError};
    use std::sync::Arc;

    fn store_with_all_keys() -> MemoryParameterStore {
        let store = MemoryParameterStore::new();
        for key in ENV_KEYS {
            store.insert(format!("/blog-api/dev/{key}"), format!("value-{key}"));
        }
        store
    }

    fn resolver(store: MemoryParameterStore) -> ParameterResolver {
        ParameterResolver::new(Arc::new(store), "blog")
    }

    fn spec<'a>(registry: Option<&'a RegistryHandle>, tag: &str) -> ComputeSpec<'a> {
        ComputeSpec {
            stage: Stage::Dev,
            contents_bucket_arn: "arn:aws:s3:::blog-contents".to_string(),
            registry,
            image_tag: tag.to_string(),
            architecture: TargetArch::Arm64,
            timeout_seconds: 30,
            public_url: false,
        }
    }

    #[tokio::test]
    async fn test_port_override_wins_over_resolved_value() {
        let store = store_with_all_keys();
        store.insert("/blog-api/dev/BLOG_APP_PORT", "9999");

        let mut graph = ResourceGraph::new();
        let handle = ComputeProvisioner::provision(&mut graph, &resolver(store), spec(None, "latest"))
            .await
            .unwrap();

        assert_eq!(handle.environment[APP_PORT_KEY], APP_PORT_VALUE);
    }

    #[tokio::test]
    async fn test_missing_env_key_aborts_without_nodes() {
        let store = store_with_all_keys();
        store.insert("/blog-api/dev/JWT_SECRET", "");

        let mut graph = ResourceGraph::new();
        let err = ComputeProvisioner::provision(&mut graph, &resolver(store), spec(None, "latest"))
            .await
            .unwrap_err();

        match err {
            crate::ProvisionError::Parameter(ParamError::Unresolved(paths)) => {
                assert_eq!(paths, vec!["/blog-api/dev/JWT_SECRET".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        // Nothing partial was composed.
        assert!(graph.is_empty());
    }

    #[tokio::test]
    async fn test_function_depends_on_image_push() {
        let mut graph = ResourceGraph::new();
        let registry = ContainerRegistry::provision(&mut graph, "blog-backend-dev").unwrap();
        let handle = ComputeProvisioner::provision(
            &mut graph,
            &resolver(store_with_all_keys()),
            spec(Some(&registry), "abc1234"),
        )
        .await
        .unwrap();

        let push = handle.image_push.expect("image push node");
        assert!(graph.has_edge(&handle.function, &push));
        assert!(graph.has_edge(&push, &registry.repository));

        let order = graph.apply_order().unwrap();
        let pos = |id: &LogicalId| order.iter().position(|x| x == id).unwrap();
        assert!(pos(&registry.repository) < pos(&push));
        assert!(pos(&push) < pos(&handle.function));
    }

    #[tokio::test]
    async fn test_image_tag_flows_verbatim() {
        let mut graph = ResourceGraph::new();
        let registry = ContainerRegistry::provision(&mut graph, "blog-backend-dev").unwrap();
        let handle = ComputeProvisioner::provision(
            &mut graph,
            &resolver(store_with_all_keys()),
            spec(Some(&registry), "deadbeef"),
        )
        .await
        .unwrap();

        let push = graph.get(handle.image_push.as_ref().unwrap()).unwrap();
        assert_eq!(push.properties["tag"], PropValue::from("deadbeef"));
    }

    #[test]
    fn test_architecture_mapping() {
        let fallback = UnknownValuePolicy::FallbackDefault;
        assert_eq!(
            TargetArch::from_host("aarch64", fallback).unwrap(),
            TargetArch::Arm64
        );
        assert_eq!(
            TargetArch::from_host("amd64", fallback).unwrap(),
            TargetArch::X86_64
        );
        // Unrecognized values fall back to x86_64 under the default policy
        assert_eq!(
            TargetArch::from_host("riscv64", fallback).unwrap(),
            TargetArch::X86_64
        );
        // and fail under fail-closed.
        assert!(TargetArch::from_host("riscv64", UnknownValuePolicy::FailClosed).is_err());
    }

    #[tokio::test]
    async fn test_public_url_variant_adds_function_url() {
        let mut graph = ResourceGraph::new();
        let mut s = spec(None, "latest");
        s.public_url = true;
        let handle = ComputeProvisioner::provision(&mut graph, &resolver(store_with_all_keys()), s)
            .await
            .unwrap();

        let url = handle.function_url.clone().expect("function url node");
        assert!(graph.has_edge(&url, &handle.function));
        assert!(handle.invoke_url().is_some());
    }
}
