//! The resource graph and deterministic apply ordering.

use std::collections::HashMap;

use crate::resource::{LogicalId, ResourceNode};
use crate::{Error, Result};

/// A directed acyclic graph of resource nodes.
///
/// Nodes keep their declaration order; edges come from explicit `depends_on`
/// declarations and from attribute reads in property bags. The apply order is
/// a topological sort with a stable tie-break by declaration order, so the
/// same composition always yields the same plan.
#[derive(Debug, Default, Clone)]
pub struct ResourceGraph {
    nodes: Vec<ResourceNode>,
    index: HashMap<LogicalId, usize>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Duplicate logical ids are a configuration error.
    pub fn add(&mut self, node: ResourceNode) -> Result<LogicalId> {
        if self.index.contains_key(&node.id) {
            return Err(Error::DuplicateResource(node.id.to_string()));
        }
        let id = node.id.clone();
        self.index.insert(id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(id)
    }

    pub fn get(&self, id: &LogicalId) -> Option<&ResourceNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn contains(&self, id: &LogicalId) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in declaration order.
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True when the graph orders `dependency` strictly before `dependent`
    /// via a declared or derived edge.
    pub fn has_edge(&self, dependent: &LogicalId, dependency: &LogicalId) -> bool {
        self.get(dependent)
            .map(|n| n.dependencies().contains(dependency))
            .unwrap_or(false)
    }

    /// Compute the apply order.
    ///
    /// Kahn's algorithm; among ready nodes the earliest-declared one is
    /// applied first. Fails on references to undeclared nodes and on cycles.
    pub fn apply_order(&self) -> Result<Vec<LogicalId>> {
        // indegree per node, adjacency as dependency -> dependents
        let mut indegree = vec![0usize; self.nodes.len()];
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.nodes.len()];

        for (i, node) in self.nodes.iter().enumerate() {
            for dep in node.dependencies() {
                let j = *self.index.get(&dep).ok_or_else(|| Error::UnknownReference {
                    from: node.id.to_string(),
                    to: dep.to_string(),
                })?;
                indegree[i] += 1;
                dependents[j].push(i);
            }
        }

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut placed = vec![false; self.nodes.len()];

        while order.len() < self.nodes.len() {
            // Lowest declaration index among ready nodes wins the tie-break.
            let next = (0..self.nodes.len()).find(|&i| !placed[i] && indegree[i] == 0);

            let Some(i) = next else {
                let stuck: Vec<&str> = self
                    .nodes
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| !placed[*i])
                    .map(|(_, n)| n.id.as_str())
                    .collect();
                return Err(Error::DependencyCycle(stuck.join(", ")));
            };

            placed[i] = true;
            order.push(self.nodes[i].id.clone());
            for &d in &dependents[i] {
                indegree[d] -= 1;
            }
        }

        Ok(order)
    }
}
