//! Storage bucket provisioning.

use blogstack_core::{
    DeletionPolicy, LogicalId, PropValue, ResourceGraph, ResourceNode, ResourceType,
};

use crate::error::ProvisionResult;

pub const CONTENTS_BUCKET_NAME_KEY: &str = "CONTENTS_BUCKET_NAME";

/// Handle to a bucket: either declared by this stack or referenced by name.
#[derive(Debug, Clone)]
pub struct StorageHandle {
    pub bucket: Option<LogicalId>,
    pub name: String,
}

impl StorageHandle {
    pub fn arn(&self) -> String {
        format!("arn:aws:s3:::{}", self.name)
    }

    /// Origin domain for a CDN behavior.
    pub fn regional_domain(&self) -> PropValue {
        match &self.bucket {
            Some(bucket) => PropValue::attr(bucket.clone(), "regionalDomainName"),
            None => PropValue::from(format!("{}.s3.amazonaws.com", self.name)),
        }
    }
}

pub struct StorageProvisioner;

impl StorageProvisioner {
    /// Reference a bucket that already exists outside this stack.
    pub fn from_existing(name: impl Into<String>) -> StorageHandle {
        StorageHandle {
            bucket: None,
            name: name.into(),
        }
    }

    /// Declare a private contents bucket: all public access blocked,
    /// bucket-owner-preferred ownership, AES256 server-side encryption with
    /// the bucket key disabled.
    pub fn provision(
        graph: &mut ResourceGraph,
        name: impl Into<String>,
        deletion_policy: DeletionPolicy,
    ) -> ProvisionResult<StorageHandle> {
        let name = name.into();
        let bucket = graph.add(
            ResourceNode::new("ContentsBucket", ResourceType::S3Bucket)
                .prop("bucket_name", name.clone())
                .prop("block_public_access", "block-all")
                .prop("object_ownership", "BucketOwnerPreferred")
                .prop("encryption", "AES256")
                .prop("bucket_key_enabled", false)
                .deletion_policy(deletion_policy),
        )?;

        Ok(StorageHandle {
            bucket: Some(bucket),
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_bucket_arn_derived_from_name() {
        let handle = StorageProvisioner::from_existing("blog-contents-dev");
        assert_eq!(handle.arn(), "arn:aws:s3:::blog-contents-dev");
        assert!(handle.bucket.is_none());
    }

    #[test]
    fn test_provisioned_bucket_carries_deletion_policy() {
        let mut graph = ResourceGraph::new();
        let handle =
            StorageProvisioner::provision(&mut graph, "blog-contents-prod", DeletionPolicy::Retain)
                .unwrap();

        let node = graph.get(handle.bucket.as_ref().unwrap()).unwrap();
        assert_eq!(node.deletion_policy, DeletionPolicy::Retain);
        assert_eq!(
            node.properties["bucket_name"],
            PropValue::from("blog-contents-prod")
        );
    }
}
