//! Dependency edges over an assembled graph
//!
//! Derives the edge structure orchestration needs to schedule one unit of
//! work per filtered node: forward edges (parents), reverse edges
//! (children), and a dependency-respecting order. Only edges between
//! filtered nodes count; `depends_on` entries with no corresponding node
//! are dangling references to out-of-project resources and carry no edge.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::DbtGraph;

/// Node identifier (unique_id from the manifest)
pub type NodeId = String;

/// Dependency graph with forward and reverse edges
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// Forward edges: node -> nodes it depends on (parents)
    parents: HashMap<NodeId, Vec<NodeId>>,

    /// Reverse edges: node -> nodes that depend on it (children)
    children: HashMap<NodeId, Vec<NodeId>>,

    /// All nodes in the graph
    nodes: HashSet<NodeId>,
}

impl DependencyGraph {
    /// Build edges over a graph's filtered node set.
    pub fn from_graph(graph: &DbtGraph) -> Self {
        let mut parents: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut children: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut nodes: HashSet<NodeId> = HashSet::new();

        for (node_id, node) in &graph.filtered_nodes {
            nodes.insert(node_id.clone());

            let deps: Vec<NodeId> = node
                .depends_on
                .iter()
                .filter(|dep| graph.filtered_nodes.contains_key(*dep))
                .cloned()
                .collect();

            for dep in &deps {
                children.entry(dep.clone()).or_default().push(node_id.clone());
            }
            if !deps.is_empty() {
                parents.insert(node_id.clone(), deps);
            }
        }

        Self {
            parents,
            children,
            nodes,
        }
    }

    /// All nodes in the graph
    pub fn all_nodes(&self) -> Vec<&NodeId> {
        self.nodes.iter().collect()
    }

    /// Immediate parents (dependencies) of a node
    pub fn parents(&self, node_id: &str) -> Vec<&NodeId> {
        self.parents
            .get(node_id)
            .map(|deps| deps.iter().collect())
            .unwrap_or_default()
    }

    /// Immediate children (dependents) of a node
    pub fn children(&self, node_id: &str) -> Vec<&NodeId> {
        self.children
            .get(node_id)
            .map(|deps| deps.iter().collect())
            .unwrap_or_default()
    }

    /// Dependency-respecting order over all nodes (Kahn's algorithm).
    ///
    /// Returns `None` when the graph has a cycle.
    pub fn topological_order(&self) -> Option<Vec<NodeId>> {
        let mut in_degree: HashMap<&NodeId, usize> = self
            .nodes
            .iter()
            .map(|node| (node, self.parents.get(node).map_or(0, Vec::len)))
            .collect();

        let mut queue: VecDeque<&NodeId> = in_degree
            .iter()
            .filter(|(_, &degree)| degree == 0)
            .map(|(&node, _)| node)
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = queue.pop_front() {
            order.push(node.clone());

            if let Some(children) = self.children.get(node) {
                for child in children {
                    if let Some(degree) = in_degree.get_mut(child) {
                        *degree -= 1;
                        if *degree == 0 {
                            queue.push_back(child);
                        }
                    }
                }
            }
        }

        // Unvisited nodes mean a cycle.
        if order.len() == self.nodes.len() {
            Some(order)
        } else {
            None
        }
    }
}
