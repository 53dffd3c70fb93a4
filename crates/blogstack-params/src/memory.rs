//! In-memory parameter store for tests and local development.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use blogstack_core::{ParameterStore, Result};

/// A store backed by a process-local map.
#[derive(Debug, Default)]
pub struct MemoryParameterStore {
    values: RwLock<BTreeMap<String, String>>,
}

impl MemoryParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(self, path: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(path, value);
        self
    }

    pub fn insert(&self, path: impl Into<String>, value: impl Into<String>) {
        self.values
            .write()
            .expect("parameter store lock poisoned")
            .insert(path.into(), value.into());
    }
}

#[async_trait]
impl ParameterStore for MemoryParameterStore {
    async fn get(&self, path: &str) -> Result<Option<String>> {
        Ok(self
            .values
            .read()
            .expect("parameter store lock poisoned")
            .get(path)
            .cloned())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .values
            .read()
            .expect("parameter store lock poisoned")
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}
