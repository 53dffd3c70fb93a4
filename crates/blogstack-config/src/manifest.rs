//! Deploy manifest parsing.

use blogstack_core::UnknownValuePolicy;
use kdl::{KdlDocument, KdlNode};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::{ConfigError, ConfigResult};

/// Compute settings from the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeSettings {
    /// How to handle a provisioning host architecture outside the two
    /// recognized values (arm64, x86_64).
    pub unknown_architecture: UnknownValuePolicy,
    /// Function timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for ComputeSettings {
    fn default() -> Self {
        Self {
            unknown_architecture: UnknownValuePolicy::default(),
            timeout_seconds: 30,
        }
    }
}

/// What the CDN distribution fronts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CdnOrigin {
    /// A storage bucket through an origin access control.
    Bucket,
    /// The compute unit's public invocation URL.
    FunctionUrl,
}

/// CDN settings from the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CdnSettings {
    pub origin: CdnOrigin,
    /// Keep distribution and supporting resources alive on stack teardown.
    pub retain_on_delete: bool,
}

impl Default for CdnSettings {
    fn default() -> Self {
        Self {
            origin: CdnOrigin::Bucket,
            retain_on_delete: false,
        }
    }
}

/// The parsed `blogstack.kdl` deploy manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Service name; prefixes every parameter path.
    pub service: String,
    pub compute: ComputeSettings,
    pub cdn: CdnSettings,
}

impl Manifest {
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        parse_manifest(&raw)
    }
}

/// Parse a deploy manifest from KDL text.
pub fn parse_manifest(kdl: &str) -> ConfigResult<Manifest> {
    let doc: KdlDocument = kdl.parse()?;

    let mut service = String::new();
    let mut compute = ComputeSettings::default();
    let mut cdn = CdnSettings::default();

    for node in doc.nodes() {
        match node.name().value() {
            "service" => {
                service = get_first_string_arg(node)
                    .ok_or_else(|| ConfigError::MissingField("service name".to_string()))?;
            }
            "compute" => {
                compute = parse_compute(node)?;
            }
            "cdn" => {
                cdn = parse_cdn(node)?;
            }
            _ => {} // Ignore unknown nodes
        }
    }

    if service.is_empty() {
        return Err(ConfigError::MissingField("service name".to_string()));
    }

    Ok(Manifest {
        service,
        compute,
        cdn,
    })
}

fn parse_compute(node: &KdlNode) -> ConfigResult<ComputeSettings> {
    let mut settings = ComputeSettings::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "unknown-architecture" => {
                    let raw = get_first_string_arg(child).unwrap_or_default();
                    settings.unknown_architecture = parse_policy(&raw)?;
                }
                "timeout-seconds" => {
                    let raw = get_first_int_arg(child).ok_or_else(|| {
                        ConfigError::InvalidValue {
                            field: "timeout-seconds".to_string(),
                            message: "expected an integer".to_string(),
                        }
                    })?;
                    settings.timeout_seconds =
                        u64::try_from(raw).map_err(|_| ConfigError::InvalidValue {
                            field: "timeout-seconds".to_string(),
                            message: format!("expected a non-negative integer, got {raw}"),
                        })?;
                }
                _ => {}
            }
        }
    }

    Ok(settings)
}

fn parse_cdn(node: &KdlNode) -> ConfigResult<CdnSettings> {
    let mut settings = CdnSettings::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "origin" => {
                    let raw = get_first_string_arg(child).unwrap_or_default();
                    settings.origin = match raw.as_str() {
                        "bucket" => CdnOrigin::Bucket,
                        "function-url" => CdnOrigin::FunctionUrl,
                        other => {
                            return Err(ConfigError::InvalidValue {
                                field: "cdn origin".to_string(),
                                message: format!(
                                    "unknown origin '{other}' (expected 'bucket' or 'function-url')"
                                ),
                            });
                        }
                    };
                }
                "retain-on-delete" => {
                    settings.retain_on_delete = get_first_bool_arg(child).unwrap_or(false);
                }
                _ => {}
            }
        }
    }

    Ok(settings)
}

fn parse_policy(raw: &str) -> ConfigResult<UnknownValuePolicy> {
    match raw {
        "fallback-default" | "" => Ok(UnknownValuePolicy::FallbackDefault),
        "fail-closed" => Ok(UnknownValuePolicy::FailClosed),
        other => Err(ConfigError::InvalidValue {
            field: "unknown-architecture".to_string(),
            message: format!("unknown policy '{other}'"),
        }),
    }
}

// Helper functions for extracting values from KDL nodes

fn get_first_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_first_int_arg(node: &KdlNode) -> Option<i128> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_integer())
}

fn get_first_bool_arg(node: &KdlNode) -> Option<bool> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_bool())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_manifest() {
        let manifest = parse_manifest(r#"service "blog""#).unwrap();
        assert_eq!(manifest.service, "blog");
        assert_eq!(manifest.compute.timeout_seconds, 30);
        assert_eq!(manifest.cdn.origin, CdnOrigin::Bucket);
        assert!(!manifest.cdn.retain_on_delete);
    }

    #[test]
    fn test_parse_full_manifest() {
        let kdl = r#"
            service "blog"

            compute {
                unknown-architecture "fail-closed"
                timeout-seconds 45
            }

            cdn {
                origin "function-url"
                retain-on-delete #true
            }
        "#;

        let manifest = parse_manifest(kdl).unwrap();
        assert_eq!(
            manifest.compute.unknown_architecture,
            UnknownValuePolicy::FailClosed
        );
        assert_eq!(manifest.compute.timeout_seconds, 45);
        assert_eq!(manifest.cdn.origin, CdnOrigin::FunctionUrl);
        assert!(manifest.cdn.retain_on_delete);
    }

    #[test]
    fn test_missing_service_rejected() {
        let result = parse_manifest(r#"cdn { origin "bucket" }"#);
        assert!(matches!(result, Err(ConfigError::MissingField(_))));
    }

    #[test]
    fn test_negative_timeout_rejected() {
        let result = parse_manifest(
            r#"
            service "blog"
            compute { timeout-seconds -1 }
        "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_bad_origin_rejected() {
        let result = parse_manifest(
            r#"
            service "blog"
            cdn { origin "carrier-pigeon" }
        "#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }
}
