//! The board: task store plus dependency graph
//!
//! A `Board` owns every task, the edges between them, the ID counter and the
//! limits the state machine enforces. Lifecycle transitions live in
//! `lifecycle.rs`; this module covers creation, lookup, deletion, linking and
//! snapshots.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::graph::{DependencyGraph, Edge, GraphError};
use super::id::TaskId;
use super::task::{Hold, Task, TaskState};

#[derive(Debug, Error, PartialEq)]
pub enum BoardError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Task ID counter exhausted")]
    IdsExhausted,

    #[error("Maximum active tasks ({0}) reached. Mark a task inactive or done first.")]
    Capacity(u32),

    #[error("Cannot activate task {id}: it depends on incomplete tasks [{}]", join_ids(.blockers))]
    Blocked { id: TaskId, blockers: Vec<TaskId> },

    #[error("Cannot {action} task {id} while it is {from}")]
    InvalidTransition {
        id: TaskId,
        from: TaskState,
        action: &'static str,
    },

    #[error(transparent)]
    Graph(#[from] GraphError),
}

fn join_ids(ids: &[TaskId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Limits read by the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum number of tasks that may be active at once (>= 1)
    pub max_active: u32,

    /// Days after which an unfinished task counts as stale
    pub stale_days: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_active: 2,
            stale_days: 14,
        }
    }
}

impl Limits {
    /// Checks the invariants on both values
    pub fn validate(&self) -> Result<(), BoardError> {
        if self.max_active < 1 {
            return Err(BoardError::Validation(
                "max_active must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Serializable form of a board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub next_id: TaskId,

    #[serde(default)]
    pub tasks: Vec<Task>,

    #[serde(default)]
    pub edges: Vec<Edge>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<Limits>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            next_id: TaskId::FIRST,
            tasks: Vec::new(),
            edges: Vec::new(),
            limits: None,
        }
    }
}

/// Summary of the tasks a cascade touched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cascade {
    /// Tasks newly put on hold, in visiting order
    pub held: Vec<TaskId>,

    /// Tasks moved from a cascade hold back to backlog, in visiting order
    pub released: Vec<TaskId>,
}

impl Cascade {
    pub fn is_empty(&self) -> bool {
        self.held.is_empty() && self.released.is_empty()
    }

    pub(crate) fn absorb(&mut self, other: Cascade) {
        self.held.extend(other.held);
        self.released.extend(other.released);
    }
}

/// In-memory task store and dependency graph
#[derive(Debug, Clone)]
pub struct Board {
    pub(crate) tasks: BTreeMap<TaskId, Task>,
    pub(crate) graph: DependencyGraph,
    pub(crate) next_id: TaskId,
    pub(crate) limits: Limits,
}

impl Default for Board {
    fn default() -> Self {
        Self::new(Limits::default())
    }
}

impl Board {
    /// Creates an empty board with the given limits
    pub fn new(limits: Limits) -> Self {
        Self {
            tasks: BTreeMap::new(),
            graph: DependencyGraph::new(),
            next_id: TaskId::FIRST,
            limits,
        }
    }

    /// Rebuilds a board from a snapshot, validating IDs and edges
    ///
    /// Snapshot limits, when present, override `limits`.
    pub fn restore(snapshot: Snapshot, limits: Limits) -> Result<Self, BoardError> {
        let limits = snapshot.limits.unwrap_or(limits);
        limits.validate()?;

        if snapshot.next_id.get() == 0 || snapshot.next_id.get() == u64::MAX {
            return Err(BoardError::Validation(format!(
                "next_id {} is out of range",
                snapshot.next_id
            )));
        }

        let mut tasks = BTreeMap::new();
        for task in snapshot.tasks {
            if task.title.trim().is_empty() {
                return Err(BoardError::Validation(format!(
                    "task {} has an empty title",
                    task.id
                )));
            }
            if task.state.is_held() != task.hold.is_some() {
                return Err(BoardError::Validation(format!(
                    "task {} has inconsistent hold details",
                    task.id
                )));
            }
            if task.state.is_complete() != task.completed_at.is_some() {
                return Err(BoardError::Validation(format!(
                    "task {} has inconsistent completion time",
                    task.id
                )));
            }
            if task.id >= snapshot.next_id {
                return Err(BoardError::Validation(format!(
                    "task {} is not below next_id {}",
                    task.id, snapshot.next_id
                )));
            }
            if tasks.insert(task.id, task).is_some() {
                return Err(BoardError::Validation("duplicate task id".to_string()));
            }
        }

        for task in tasks.values() {
            if let Some(root) = task.hold.as_ref().and_then(Hold::root) {
                if !tasks.contains_key(&root) {
                    return Err(BoardError::Validation(format!(
                        "task {} is held by unknown task {}",
                        task.id, root
                    )));
                }
            }
        }

        let graph = DependencyGraph::from_edges(tasks.keys().copied(), snapshot.edges)?;

        Ok(Self {
            tasks,
            graph,
            next_id: snapshot.next_id,
            limits,
        })
    }

    /// Captures the board as a snapshot
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            next_id: self.next_id,
            tasks: self.tasks.values().cloned().collect(),
            edges: self.graph.edges(),
            limits: Some(self.limits),
        }
    }

    /// Returns the limits in force
    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Replaces the limits
    pub fn set_limits(&mut self, limits: Limits) -> Result<(), BoardError> {
        limits.validate()?;
        self.limits = limits;
        Ok(())
    }

    /// Returns the ID the next added task will receive
    pub fn next_id(&self) -> TaskId {
        self.next_id
    }

    /// Adds a backlog task created now
    pub fn add(&mut self, title: &str) -> Result<&Task, BoardError> {
        self.add_at(title, Utc::now())
    }

    /// Adds a backlog task with an explicit creation time
    pub fn add_at(&mut self, title: &str, created_at: DateTime<Utc>) -> Result<&Task, BoardError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BoardError::Validation(
                "task title cannot be empty".to_string(),
            ));
        }

        let id = self.next_id;
        self.next_id = id.next().ok_or(BoardError::IdsExhausted)?;
        self.graph.add_task(id);
        Ok(self
            .tasks
            .entry(id)
            .or_insert_with(|| Task::new(id, title, created_at)))
    }

    /// Adds a task that starts on hold, waiting on `blocker`
    pub fn add_held(&mut self, title: &str, blocker: &str) -> Result<&Task, BoardError> {
        let blocker = blocker.trim();
        if blocker.is_empty() {
            return Err(BoardError::Validation(
                "blocker cannot be empty".to_string(),
            ));
        }

        let id = self.add(title)?.id;
        let task = self.get_mut(id)?;
        task.put_on_hold(Hold::manual(Some(blocker.to_string())));
        Ok(&*task)
    }

    /// Looks up a task
    pub fn get(&self, id: TaskId) -> Result<&Task, BoardError> {
        self.tasks.get(&id).ok_or(BoardError::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: TaskId) -> Result<&mut Task, BoardError> {
        self.tasks.get_mut(&id).ok_or(BoardError::NotFound(id))
    }

    /// Returns true if the task exists
    pub fn contains(&self, id: TaskId) -> bool {
        self.tasks.contains_key(&id)
    }

    /// Lists tasks in insertion order, optionally filtered by state
    pub fn list(&self, filter: Option<TaskState>) -> Vec<&Task> {
        self.tasks
            .values()
            .filter(|t| filter.map_or(true, |state| t.state == state))
            .collect()
    }

    /// Returns every task in insertion order
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Returns the number of tasks
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if the board has no tasks
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Deletes a task and every edge touching it
    ///
    /// Former dependents held only because of this task are released.
    pub fn delete(&mut self, id: TaskId) -> Result<(Task, Cascade), BoardError> {
        if !self.contains(id) {
            return Err(BoardError::NotFound(id));
        }

        let dependents = self.graph.dependents_of(id);
        self.graph.remove_task(id);
        let task = self.tasks.remove(&id).ok_or(BoardError::NotFound(id))?;

        let cascade = self.reconsider(dependents, Utc::now());
        Ok((task, cascade))
    }

    /// Removes every task and edge; the ID counter and limits survive
    pub fn reset(&mut self) -> usize {
        let removed = self.tasks.len();
        self.tasks.clear();
        self.graph = DependencyGraph::new();
        removed
    }

    /// Adds the edge `blocker -> dependent`
    ///
    /// If the blocker is on hold, the hold cascades onto the dependent.
    pub fn link(&mut self, blocker: TaskId, dependent: TaskId) -> Result<Cascade, BoardError> {
        self.get(blocker)?;
        self.get(dependent)?;
        self.graph.link(blocker, dependent)?;

        let blocker_task = self.get(blocker)?;
        if !blocker_task.state.is_held() {
            return Ok(Cascade::default());
        }

        let root = blocker_task
            .hold
            .as_ref()
            .and_then(|h| h.root())
            .unwrap_or(blocker);
        let mut cascade = self.cascade_hold_from(root, [dependent]);
        cascade.absorb(self.reconsider([dependent], Utc::now()));
        Ok(cascade)
    }

    /// Removes the edge `blocker -> dependent`; missing edges are a no-op
    pub fn unlink(&mut self, blocker: TaskId, dependent: TaskId) -> Cascade {
        if !self.graph.unlink(blocker, dependent) {
            return Cascade::default();
        }
        self.reconsider([dependent], Utc::now())
    }

    /// Returns the direct blockers of a task
    pub fn blockers_of(&self, id: TaskId) -> BTreeSet<TaskId> {
        self.graph.blockers_of(id)
    }

    /// Returns the direct dependents of a task
    pub fn dependents_of(&self, id: TaskId) -> BTreeSet<TaskId> {
        self.graph.dependents_of(id)
    }

    /// Returns all edges, sorted
    pub fn edges(&self) -> Vec<Edge> {
        self.graph.edges()
    }

    /// Returns true if the edge `blocker -> dependent` exists
    pub fn has_edge(&self, blocker: TaskId, dependent: TaskId) -> bool {
        self.graph.has_edge(blocker, dependent)
    }

    /// Returns the direct blockers that are not done
    pub fn open_blockers(&self, id: TaskId) -> Vec<TaskId> {
        self.graph
            .blockers_of(id)
            .into_iter()
            .filter(|b| self.tasks.get(b).is_some_and(|t| !t.state.is_complete()))
            .collect()
    }

    /// True iff any direct blocker is not done
    pub fn is_blocked(&self, id: TaskId) -> Result<bool, BoardError> {
        self.get(id)?;
        Ok(!self.open_blockers(id).is_empty())
    }

    /// Counts active tasks
    pub fn active_count(&self) -> usize {
        self.tasks.values().filter(|t| t.state.is_active()).count()
    }
}
