//! Deployment stages.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Deployment environment selector. Controls the parameter namespace paths
/// and resource naming for one provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Dev,
    Prod,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Dev => "dev",
            Stage::Prod => "prod",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Stage {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dev" => Ok(Stage::Dev),
            "prod" => Ok(Stage::Prod),
            other => Err(Error::InvalidStage(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_stages_parse() {
        assert_eq!("dev".parse::<Stage>().unwrap(), Stage::Dev);
        assert_eq!("prod".parse::<Stage>().unwrap(), Stage::Prod);
    }

    #[test]
    fn test_invalid_stage_rejected() {
        for bad in ["staging", "PROD", "Dev", "", "production"] {
            assert!(matches!(
                bad.parse::<Stage>(),
                Err(Error::InvalidStage(_))
            ));
        }
    }
}
