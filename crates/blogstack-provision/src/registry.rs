//! Container registry provisioning.

use blogstack_core::{LogicalId, ResourceGraph, ResourceNode, ResourceType};

use crate::error::ProvisionResult;

/// Handle to a provisioned image repository.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    pub repository: LogicalId,
    pub name: String,
}

/// Declares the image repository a build publishes into before the compute
/// unit is created. Re-declaring the same repository is idempotent on the
/// provider side; no retention policy, unbounded image accumulation is an
/// accepted operational cost.
pub struct ContainerRegistry;

impl ContainerRegistry {
    pub fn provision(graph: &mut ResourceGraph, stack_name: &str) -> ProvisionResult<RegistryHandle> {
        let name = format!("{stack_name}-repository").to_lowercase();

        let repository = graph.add(
            ResourceNode::new("Repository", ResourceType::EcrRepository)
                .prop("repository_name", name.clone()),
        )?;

        Ok(RegistryHandle { repository, name })
    }
}
