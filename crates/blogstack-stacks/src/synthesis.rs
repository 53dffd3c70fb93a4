//! The result of composing a stack: graph, outputs, plan, template.

use blogstack_core::{
    DeletionPolicy, Error, LogicalId, ResourceGraph, ResourceType, Result, Stage, StackOutput,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One composed stack, ready to plan or render.
#[derive(Debug)]
pub struct Synthesis {
    pub stack_name: String,
    pub stage: Stage,
    pub graph: ResourceGraph,
    pub outputs: Vec<StackOutput>,
}

impl Synthesis {
    pub fn new(stack_name: impl Into<String>, stage: Stage) -> Self {
        Self {
            stack_name: stack_name.into(),
            stage,
            graph: ResourceGraph::new(),
            outputs: Vec::new(),
        }
    }

    /// A synthesis with zero resources (unrecognized stack selection).
    pub fn empty(stack_name: impl Into<String>, stage: Stage) -> Self {
        Self::new(stack_name, stage)
    }

    /// Ordered apply plan for this synthesis.
    pub fn plan(&self) -> Result<Plan> {
        let order = self.graph.apply_order()?;
        let mut operations = Vec::with_capacity(order.len());
        for id in order {
            let node = self.node(&id)?;
            operations.push(PlanOperation {
                id,
                resource_type: node.resource_type,
                deletion_policy: node.deletion_policy,
            });
        }

        Ok(Plan {
            run_id: Uuid::now_v7(),
            synthesized_at: Utc::now(),
            stack_name: self.stack_name.clone(),
            stage: self.stage,
            operations,
        })
    }

    /// Declarative template rendering: resources in apply order with
    /// attribute reads as `${id.attr}` placeholders, plus outputs.
    pub fn template(&self) -> Result<serde_json::Value> {
        let order = self.graph.apply_order()?;

        let mut resources = serde_json::Map::new();
        for id in &order {
            let node = self.node(id)?;
            let mut entry = serde_json::Map::new();
            entry.insert(
                "type".to_string(),
                serde_json::json!(node.resource_type.as_str()),
            );
            let props: serde_json::Map<String, serde_json::Value> = node
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect();
            entry.insert("properties".to_string(), serde_json::Value::Object(props));
            if !node.depends_on.is_empty() {
                entry.insert(
                    "depends_on".to_string(),
                    serde_json::json!(
                        node.depends_on
                            .iter()
                            .map(|d| d.to_string())
                            .collect::<Vec<_>>()
                    ),
                );
            }
            if node.deletion_policy == DeletionPolicy::Retain {
                entry.insert("deletion_policy".to_string(), serde_json::json!("retain"));
            }
            resources.insert(id.to_string(), serde_json::Value::Object(entry));
        }

        let outputs: serde_json::Map<String, serde_json::Value> = self
            .outputs
            .iter()
            .map(|o| (o.name.clone(), o.to_json()))
            .collect();

        Ok(serde_json::json!({
            "stack": self.stack_name,
            "stage": self.stage,
            "resources": resources,
            "outputs": outputs,
        }))
    }

    // apply_order only yields ids present in the graph.
    fn node(&self, id: &LogicalId) -> Result<&blogstack_core::ResourceNode> {
        self.graph.get(id).ok_or_else(|| Error::UnknownReference {
            from: self.stack_name.clone(),
            to: id.to_string(),
        })
    }
}

/// One create/update operation in an apply plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanOperation {
    pub id: LogicalId,
    pub resource_type: ResourceType,
    pub deletion_policy: DeletionPolicy,
}

/// A dependency-ordered apply plan for one provisioning run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub run_id: Uuid,
    pub synthesized_at: DateTime<Utc>,
    pub stack_name: String,
    pub stage: Stage,
    pub operations: Vec<PlanOperation>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use blogstack_core::{PropValue, ResourceNode};

    #[test]
    fn test_empty_synthesis_plans_zero_operations() {
        let synthesis = Synthesis::empty("blog-dev", Stage::Dev);
        let plan = synthesis.plan().unwrap();
        assert!(plan.operations.is_empty());
    }

    #[test]
    fn test_template_renders_in_apply_order() {
        let mut synthesis = Synthesis::new("blog-dev", Stage::Dev);
        synthesis
            .graph
            .add(
                ResourceNode::new("Function", ResourceType::LambdaFunction)
                    .prop("role_arn", PropValue::attr("Role", "arn")),
            )
            .unwrap();
        synthesis
            .graph
            .add(ResourceNode::new("Role", ResourceType::IamRole))
            .unwrap();

        let template = synthesis.template().unwrap();
        let resources = template["resources"].as_object().unwrap();
        let keys: Vec<&String> = resources.keys().collect();
        assert_eq!(keys, vec!["Role", "Function"]);
        assert_eq!(
            resources["Function"]["properties"]["role_arn"],
            serde_json::json!("${Role.arn}")
        );
    }
}
