//! Stage-scoped parameter resolution.

use std::collections::BTreeMap;
use std::sync::Arc;

use blogstack_core::{ParameterNamespace, ParameterStore, Stage};
use tracing::debug;

use crate::error::{ParamError, ParamResult};

/// Resolves named configuration values for one service against a store
/// backend. Values are fetched at synthesis time; a missing required key is
/// surfaced immediately to the operator, no retries.
pub struct ParameterResolver {
    store: Arc<dyn ParameterStore>,
    service: String,
}

impl ParameterResolver {
    pub fn new(store: Arc<dyn ParameterStore>, service: impl Into<String>) -> Self {
        Self {
            store,
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    /// Full lookup path for a key in this resolver's service.
    pub fn path(&self, namespace: ParameterNamespace, stage: Stage, key: &str) -> String {
        namespace.path(&self.service, stage, key)
    }

    /// Resolve a single required key. Missing paths and empty values are
    /// fatal and name the full path.
    pub async fn resolve(
        &self,
        namespace: ParameterNamespace,
        stage: Stage,
        key: &str,
    ) -> ParamResult<String> {
        let path = self.path(namespace, stage, key);
        debug!(%path, "resolving parameter");
        match self.store.get(&path).await? {
            None => Err(ParamError::Missing(path)),
            Some(value) if value.is_empty() => Err(ParamError::Empty(path)),
            Some(value) => Ok(value),
        }
    }

    /// Resolve a set of required keys, all-or-nothing.
    ///
    /// Either every key resolves to a non-empty value, or the error names
    /// every missing/empty path and nothing is returned. Callers must never
    /// see a partially assembled map.
    pub async fn resolve_all(
        &self,
        namespace: ParameterNamespace,
        stage: Stage,
        keys: &[&str],
    ) -> ParamResult<BTreeMap<String, String>> {
        let mut values = BTreeMap::new();
        let mut unresolved = Vec::new();

        for key in keys {
            match self.resolve(namespace, stage, key).await {
                Ok(value) => {
                    values.insert((*key).to_string(), value);
                }
                Err(ParamError::Missing(path)) | Err(ParamError::Empty(path)) => {
                    unresolved.push(path);
                }
                Err(other) => return Err(other),
            }
        }

        if !unresolved.is_empty() {
            return Err(ParamError::Unresolved(unresolved));
        }

        Ok(values)
    }
}
