//! Resource nodes: logical identifiers, types, and property values.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Logical identifier of a resource within one stack.
///
/// Stable across synthesis runs; the apply engine keys resource state on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[display("{_0}")]
pub struct LogicalId(String);

impl LogicalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LogicalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for LogicalId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Provider resource kinds the provisioners know how to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceType {
    EcrRepository,
    ImagePush,
    IamRole,
    LambdaFunction,
    LambdaFunctionUrl,
    LambdaPermission,
    HttpApi,
    HttpIntegration,
    HttpRoute,
    ApiDomainName,
    ApiMapping,
    DnsRecord,
    S3Bucket,
    S3BucketPolicy,
    CloudFrontDistribution,
    OriginAccessControl,
    CachePolicy,
    OriginRequestPolicy,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::EcrRepository => "ecr.repository",
            ResourceType::ImagePush => "ecr.image-push",
            ResourceType::IamRole => "iam.role",
            ResourceType::LambdaFunction => "lambda.function",
            ResourceType::LambdaFunctionUrl => "lambda.function-url",
            ResourceType::LambdaPermission => "lambda.permission",
            ResourceType::HttpApi => "apigateway.http-api",
            ResourceType::HttpIntegration => "apigateway.integration",
            ResourceType::HttpRoute => "apigateway.route",
            ResourceType::ApiDomainName => "apigateway.domain-name",
            ResourceType::ApiMapping => "apigateway.api-mapping",
            ResourceType::DnsRecord => "route53.record",
            ResourceType::S3Bucket => "s3.bucket",
            ResourceType::S3BucketPolicy => "s3.bucket-policy",
            ResourceType::CloudFrontDistribution => "cloudfront.distribution",
            ResourceType::OriginAccessControl => "cloudfront.origin-access-control",
            ResourceType::CachePolicy => "cloudfront.cache-policy",
            ResourceType::OriginRequestPolicy => "cloudfront.origin-request-policy",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What happens to the live resource when its node is removed from the stack.
///
/// Retain is a deliberate data-loss-prevention flag on resources whose
/// contents must survive stack teardown (e.g. CDN-fronted buckets).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionPolicy {
    #[default]
    Delete,
    Retain,
}

/// A read of another resource's apply-time attribute.
///
/// Attribute reads create implicit dependency edges: the referenced resource
/// must be applied before the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttrRef {
    pub id: LogicalId,
    pub attr: String,
}

impl AttrRef {
    pub fn new(id: impl Into<LogicalId>, attr: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attr: attr.into(),
        }
    }
}

/// A resource property value. Either concrete, or a deferred attribute read
/// resolved by the apply engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropValue {
    String(String),
    Number(i64),
    Bool(bool),
    Attr(AttrRef),
    List(Vec<PropValue>),
    Map(BTreeMap<String, PropValue>),
}

impl PropValue {
    pub fn attr(id: impl Into<LogicalId>, attr: impl Into<String>) -> Self {
        PropValue::Attr(AttrRef::new(id, attr))
    }

    /// Collect every logical id this value reads an attribute from.
    pub fn referenced_ids(&self, out: &mut Vec<LogicalId>) {
        match self {
            PropValue::Attr(r) => out.push(r.id.clone()),
            PropValue::List(items) => {
                for item in items {
                    item.referenced_ids(out);
                }
            }
            PropValue::Map(map) => {
                for value in map.values() {
                    value.referenced_ids(out);
                }
            }
            PropValue::String(_) | PropValue::Number(_) | PropValue::Bool(_) => {}
        }
    }

    /// Render to JSON. Attribute reads become `${id.attr}` placeholder
    /// strings for the apply engine to substitute.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            PropValue::String(s) => serde_json::Value::String(s.clone()),
            PropValue::Number(n) => serde_json::Value::Number((*n).into()),
            PropValue::Bool(b) => serde_json::Value::Bool(*b),
            PropValue::List(items) => {
                serde_json::Value::Array(items.iter().map(PropValue::to_json).collect())
            }
            PropValue::Map(map) => serde_json::Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            PropValue::Attr(r) => serde_json::Value::String(format!("${{{}.{}}}", r.id, r.attr)),
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Number(n)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<AttrRef> for PropValue {
    fn from(r: AttrRef) -> Self {
        PropValue::Attr(r)
    }
}

impl<V: Into<PropValue>> FromIterator<(String, V)> for PropValue {
    fn from_iter<T: IntoIterator<Item = (String, V)>>(iter: T) -> Self {
        PropValue::Map(iter.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// One node in the resource graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Logical identifier, unique within the stack.
    pub id: LogicalId,
    /// Provider resource kind.
    pub resource_type: ResourceType,
    /// Resource property bag.
    pub properties: BTreeMap<String, PropValue>,
    /// Explicitly declared prerequisites, in addition to edges implied by
    /// attribute reads in `properties`.
    pub depends_on: Vec<LogicalId>,
    /// Teardown behavior.
    pub deletion_policy: DeletionPolicy,
}

impl ResourceNode {
    pub fn new(id: impl Into<LogicalId>, resource_type: ResourceType) -> Self {
        Self {
            id: id.into(),
            resource_type,
            properties: BTreeMap::new(),
            depends_on: Vec::new(),
            deletion_policy: DeletionPolicy::Delete,
        }
    }

    pub fn prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn depends_on(mut self, id: impl Into<LogicalId>) -> Self {
        self.depends_on.push(id.into());
        self
    }

    pub fn deletion_policy(mut self, policy: DeletionPolicy) -> Self {
        self.deletion_policy = policy;
        self
    }

    /// All logical ids this node depends on: explicit edges first, then
    /// attribute reads from the property bag.
    pub fn dependencies(&self) -> Vec<LogicalId> {
        let mut deps = self.depends_on.clone();
        for value in self.properties.values() {
            value.referenced_ids(&mut deps);
        }
        deps
    }
}
