//! Deploy configuration for blogstack.
//!
//! This crate handles:
//! - Parsing the `blogstack.kdl` deploy manifest
//! - Collecting out-of-band inputs (stage, stack selection, commit) into one
//!   validated [`DeployContext`] at the boundary

pub mod context;
pub mod error;
pub mod manifest;

pub use context::{DeployContext, StackSelection};
pub use error::{ConfigError, ConfigResult};
pub use manifest::{CdnOrigin, CdnSettings, ComputeSettings, Manifest};
