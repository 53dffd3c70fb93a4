//! Resource provisioners for blogstack.
//!
//! Each provisioner emits nodes into a [`blogstack_core::ResourceGraph`] and
//! returns a handle other provisioners compose against. Ordering between
//! resources is carried by explicit edges and attribute reads, never by call
//! order.

pub mod cdn;
pub mod certificate;
pub mod compute;
pub mod dns;
pub mod error;
pub mod gateway;
pub mod registry;
pub mod storage;

pub use cdn::{BucketCdn, CdnHandle, FunctionCdn};
pub use certificate::{CertificateProvisioner, CertificateRef};
pub use compute::{ComputeHandle, ComputeProvisioner, ComputeSpec, TargetArch};
pub use dns::{DnsProvisioner, RecordName};
pub use error::{ProvisionError, ProvisionResult};
pub use gateway::{AliasTarget, CustomDomain, GatewayHandle, GatewayProvisioner};
pub use registry::{ContainerRegistry, RegistryHandle};
pub use storage::{StorageHandle, StorageProvisioner};
