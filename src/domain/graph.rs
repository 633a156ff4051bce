//! Dependency graph for tasks
//!
//! An edge `blocker -> dependent` means the dependent cannot start until the
//! blocker is done. The graph is kept acyclic on every insertion.
//! Uses petgraph for graph operations.

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use super::id::TaskId;

#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Adding dependency {0} -> {1} would create a cycle")]
    CycleDetected(TaskId, TaskId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Cannot link task {0} to itself")]
    SelfLink(TaskId),

    #[error("Dependency {0} -> {1} already exists")]
    DuplicateEdge(TaskId, TaskId),
}

/// A dependency edge: `dependent` waits for `blocker`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub blocker: TaskId,
    pub dependent: TaskId,
}

impl Edge {
    pub fn new(blocker: TaskId, dependent: TaskId) -> Self {
        Self { blocker, dependent }
    }
}

/// A dependency graph over task IDs
#[derive(Debug, Default, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph (blocker -> dependent)
    graph: DiGraph<TaskId, ()>,

    /// Map from TaskId to node index
    node_map: HashMap<TaskId, NodeIndex>,
}

impl DependencyGraph {
    /// Creates an empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from task IDs and edges, validating every edge
    pub fn from_edges(
        task_ids: impl IntoIterator<Item = TaskId>,
        edges: impl IntoIterator<Item = Edge>,
    ) -> Result<Self, GraphError> {
        let mut graph = Self::new();

        // First pass: add all nodes
        for id in task_ids {
            graph.add_task(id);
        }

        // Second pass: add all edges
        for edge in edges {
            graph.link(edge.blocker, edge.dependent)?;
        }

        Ok(graph)
    }

    /// Adds a task to the graph
    pub fn add_task(&mut self, task_id: TaskId) {
        if !self.node_map.contains_key(&task_id) {
            let idx = self.graph.add_node(task_id);
            self.node_map.insert(task_id, idx);
        }
    }

    /// Removes a task from the graph (and all its edges)
    pub fn remove_task(&mut self, task_id: TaskId) -> bool {
        if let Some(idx) = self.node_map.remove(&task_id) {
            self.graph.remove_node(idx);
            // petgraph moves the last node into the freed slot, so indices shift
            self.rebuild_node_map();
            true
        } else {
            false
        }
    }

    /// Rebuilds the node map after removal
    fn rebuild_node_map(&mut self) {
        self.node_map.clear();
        for idx in self.graph.node_indices() {
            if let Some(task_id) = self.graph.node_weight(idx) {
                self.node_map.insert(*task_id, idx);
            }
        }
    }

    fn index(&self, task_id: TaskId) -> Result<NodeIndex, GraphError> {
        self.node_map
            .get(&task_id)
            .copied()
            .ok_or(GraphError::TaskNotFound(task_id))
    }

    /// Checks whether `blocker -> dependent` could be added, without adding it
    pub fn check_link(&self, blocker: TaskId, dependent: TaskId) -> Result<(), GraphError> {
        let blocker_idx = self.index(blocker)?;
        let dependent_idx = self.index(dependent)?;

        if blocker == dependent {
            return Err(GraphError::SelfLink(blocker));
        }

        if self.graph.contains_edge(blocker_idx, dependent_idx) {
            return Err(GraphError::DuplicateEdge(blocker, dependent));
        }

        // If the blocker is already reachable from the dependent, the new edge closes a loop
        if has_path_connecting(&self.graph, dependent_idx, blocker_idx, None) {
            return Err(GraphError::CycleDetected(blocker, dependent));
        }

        Ok(())
    }

    /// Adds the edge `blocker -> dependent`
    ///
    /// The graph is unchanged when an error is returned.
    pub fn link(&mut self, blocker: TaskId, dependent: TaskId) -> Result<(), GraphError> {
        self.check_link(blocker, dependent)?;
        let blocker_idx = self.index(blocker)?;
        let dependent_idx = self.index(dependent)?;
        self.graph.add_edge(blocker_idx, dependent_idx, ());
        Ok(())
    }

    /// Removes the edge `blocker -> dependent`, returning whether it existed
    pub fn unlink(&mut self, blocker: TaskId, dependent: TaskId) -> bool {
        let (Ok(blocker_idx), Ok(dependent_idx)) = (self.index(blocker), self.index(dependent))
        else {
            return false;
        };

        match self.graph.find_edge(blocker_idx, dependent_idx) {
            Some(edge) => {
                self.graph.remove_edge(edge);
                true
            }
            None => false,
        }
    }

    fn neighbors(&self, task_id: TaskId, direction: Direction) -> BTreeSet<TaskId> {
        let Some(&idx) = self.node_map.get(&task_id) else {
            return BTreeSet::new();
        };

        self.graph
            .neighbors_directed(idx, direction)
            .filter_map(|n| self.graph.node_weight(n).copied())
            .collect()
    }

    /// Returns the direct blockers of a task
    pub fn blockers_of(&self, task_id: TaskId) -> BTreeSet<TaskId> {
        self.neighbors(task_id, Direction::Incoming)
    }

    /// Returns the direct dependents of a task (tasks that wait for it)
    pub fn dependents_of(&self, task_id: TaskId) -> BTreeSet<TaskId> {
        self.neighbors(task_id, Direction::Outgoing)
    }

    /// Returns true if the edge exists
    pub fn has_edge(&self, blocker: TaskId, dependent: TaskId) -> bool {
        match (self.node_map.get(&blocker), self.node_map.get(&dependent)) {
            (Some(&b), Some(&d)) => self.graph.contains_edge(b, d),
            _ => false,
        }
    }

    /// Returns all edges, sorted by (blocker, dependent)
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges: Vec<Edge> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .filter_map(|(b, d)| {
                Some(Edge::new(
                    *self.graph.node_weight(b)?,
                    *self.graph.node_weight(d)?,
                ))
            })
            .collect();
        edges.sort();
        edges
    }

    /// Returns true if the graph contains the task
    pub fn contains(&self, task_id: TaskId) -> bool {
        self.node_map.contains_key(&task_id)
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.node_map.len()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.node_map.is_empty()
    }

    /// Returns the number of edges
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}
