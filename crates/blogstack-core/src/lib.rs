//! Core domain types for the blogstack synthesis engine.
//!
//! This crate contains:
//! - Deployment stages and unrecognized-value policies
//! - Logical identifiers, resource types, and property values
//! - The resource graph and deterministic apply ordering
//! - Stack outputs
//! - The parameter store abstraction

pub mod error;
pub mod graph;
pub mod output;
pub mod parameter;
pub mod policy;
pub mod resource;
pub mod stage;

pub use error::{Error, Result};
pub use graph::ResourceGraph;
pub use output::StackOutput;
pub use parameter::{ParameterNamespace, ParameterStore};
pub use policy::UnknownValuePolicy;
pub use resource::{AttrRef, DeletionPolicy, LogicalId, PropValue, ResourceNode, ResourceType};
pub use stage::Stage;
