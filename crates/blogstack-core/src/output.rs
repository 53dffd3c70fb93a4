//! Stack outputs.

use serde::{Deserialize, Serialize};

use crate::resource::PropValue;

/// A named value surfaced after a successful apply: endpoint URLs, domain
/// names, resource identifiers. An output with an export name can be
/// imported by another stack; export names are stage-scoped by convention.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackOutput {
    pub name: String,
    pub value: PropValue,
    pub export_name: Option<String>,
}

impl StackOutput {
    pub fn new(name: impl Into<String>, value: impl Into<PropValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            export_name: None,
        }
    }

    pub fn exported_as(mut self, export_name: impl Into<String>) -> Self {
        self.export_name = Some(export_name.into());
        self
    }

    pub fn to_json(&self) -> serde_json::Value {
        let mut obj = serde_json::Map::new();
        obj.insert("value".to_string(), self.value.to_json());
        if let Some(export) = &self.export_name {
            obj.insert("export".to_string(), serde_json::json!(export));
        }
        serde_json::Value::Object(obj)
    }
}
