//! Parameter resolution for blogstack.
//!
//! Resolves (namespace, stage, key) triples against a [`ParameterStore`]
//! backend using the fixed path convention from `blogstack-core`. A missing
//! or empty required parameter is a fatal configuration error; batch
//! resolution is all-or-nothing.

pub mod error;
pub mod file;
pub mod memory;
pub mod resolver;

pub use blogstack_core::{ParameterNamespace, ParameterStore};
pub use error::{ParamError, ParamResult};
pub use file::FileParameterStore;
pub use memory::MemoryParameterStore;
pub use resolver::ParameterResolver;
