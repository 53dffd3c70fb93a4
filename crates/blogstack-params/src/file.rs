//! JSON-file parameter store for operator-local synthesis.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use blogstack_core::{ParameterStore, Result};

use crate::error::ParamResult;

/// A read-only store loaded from a flat JSON object of path -> value, e.g.
///
/// ```json
/// {
///   "/blog-api/dev/JWT_SECRET": "...",
///   "/blog-api-infra/dev/DOMAIN_NAME": "api.dev.example.com"
/// }
/// ```
#[derive(Debug)]
pub struct FileParameterStore {
    values: BTreeMap<String, String>,
}

impl FileParameterStore {
    pub fn load(path: impl AsRef<Path>) -> ParamResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        let values: BTreeMap<String, String> = serde_json::from_str(&raw)?;
        Ok(Self { values })
    }

    pub fn from_map(values: BTreeMap<String, String>) -> Self {
        Self { values }
    }
}

#[async_trait]
impl ParameterStore for FileParameterStore {
    async fn get(&self, path: &str) -> Result<Option<String>> {
        Ok(self.values.get(path).cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .values
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
