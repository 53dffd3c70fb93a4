//! DNS alias record provisioning.

use std::collections::BTreeMap;

use blogstack_core::{LogicalId, PropValue, ResourceGraph, ResourceNode, ResourceType};
use serde::{Deserialize, Serialize};

use crate::error::ProvisionResult;
use crate::gateway::AliasTarget;

pub const HOSTED_ZONE_ID_KEY: &str = "ROUTE53_HOSTED_ZONE_ID";
pub const HOSTED_ZONE_NAME_KEY: &str = "ROUTE53_HOSTED_ZONE_NAME";

/// A fully-qualified record name, normalized to exactly one trailing dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordName(String);

impl RecordName {
    pub fn new(name: &str) -> Self {
        Self(format!("{}.", name.trim_end_matches('.')))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Creates alias records in an existing hosted zone. Pure wiring: a naming
/// collision with an existing record surfaces as an apply-time error, there
/// is no reconciliation here.
pub struct DnsProvisioner {
    hosted_zone_id: String,
    hosted_zone_name: String,
}

impl DnsProvisioner {
    pub fn new(hosted_zone_id: impl Into<String>, hosted_zone_name: impl Into<String>) -> Self {
        Self {
            hosted_zone_id: hosted_zone_id.into(),
            hosted_zone_name: hosted_zone_name.into(),
        }
    }

    /// Point `record` at the target's regional endpoint. Ordering after the
    /// gateway domain is carried by the attribute reads in the target.
    pub fn create_alias_record(
        &self,
        graph: &mut ResourceGraph,
        record: RecordName,
        target: AliasTarget,
    ) -> ProvisionResult<LogicalId> {
        let id = graph.add(
            ResourceNode::new("AliasRecord", ResourceType::DnsRecord)
                .prop("hosted_zone_id", self.hosted_zone_id.clone())
                .prop("hosted_zone_name", self.hosted_zone_name.clone())
                .prop("record_name", record.as_str())
                .prop("record_type", "A")
                .prop(
                    "alias_target",
                    PropValue::Map(BTreeMap::from([
                        ("dns_name".to_string(), target.dns_name),
                        ("hosted_zone_id".to_string(), target.hosted_zone_id),
                    ])),
                ),
        )?;
        Ok(id)
    }
}
