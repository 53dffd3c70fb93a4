//! The validated deploy context.

use blogstack_core::Stage;
use serde::{Deserialize, Serialize};

use crate::manifest::{CdnSettings, ComputeSettings, Manifest};
use crate::{ConfigError, ConfigResult};

/// Image tag used when no commit identifier is supplied.
pub const DEFAULT_IMAGE_TAG: &str = "latest";

/// Which stack a run composes.
///
/// Unrecognized selections are carried, not rejected: composition emits a
/// diagnostic and zero resources for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackSelection {
    App,
    Cdn,
    Unrecognized(String),
}

impl StackSelection {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "app" => StackSelection::App,
            "cdn" => StackSelection::Cdn,
            other => StackSelection::Unrecognized(other.to_string()),
        }
    }
}

impl std::fmt::Display for StackSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StackSelection::App => f.write_str("app"),
            StackSelection::Cdn => f.write_str("cdn"),
            StackSelection::Unrecognized(raw) => write!(f, "unrecognized({raw})"),
        }
    }
}

/// Everything one provisioning run needs, validated once at the boundary.
///
/// Stage, stack selection, and commit are out-of-band inputs (flags or
/// environment); the rest comes from the manifest. An absent or invalid
/// stage aborts here, before any resource is composed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeployContext {
    pub service: String,
    pub stage: Stage,
    pub stack: StackSelection,
    pub commit: Option<String>,
    pub compute: ComputeSettings,
    pub cdn: CdnSettings,
}

impl DeployContext {
    pub fn build(
        manifest: Manifest,
        stage: Option<&str>,
        stack: Option<&str>,
        commit: Option<String>,
    ) -> ConfigResult<Self> {
        let stage = stage
            .ok_or_else(|| ConfigError::MissingField("stage".to_string()))?
            .parse::<Stage>()?;

        let stack = StackSelection::parse(stack.unwrap_or("app"));

        // An env var set to the empty string means "not supplied".
        let commit = commit.filter(|c| !c.trim().is_empty());

        Ok(Self {
            service: manifest.service,
            stage,
            stack,
            commit,
            compute: manifest.compute,
            cdn: manifest.cdn,
        })
    }

    /// The image tag for this run: the commit identifier verbatim, or the
    /// "latest" sentinel when none was supplied.
    pub fn image_tag(&self) -> &str {
        self.commit.as_deref().unwrap_or(DEFAULT_IMAGE_TAG)
    }
}
