//! Domain models for wip
//!
//! Contains the task-graph engine without any I/O concerns: the task store,
//! the dependency graph, the lifecycle state machine and the tree view.

mod id;
mod task;
mod graph;
mod board;
mod lifecycle;
mod merge;
pub mod query;
pub mod tree;

pub use id::{IdError, TaskId};
pub use task::{Hold, HoldOrigin, Task, TaskState};
pub use graph::{DependencyGraph, Edge, GraphError};
pub use board::{Board, BoardError, Cascade, Limits, Snapshot};
pub use merge::MergeReport;
pub use tree::{render, Group, RenderOptions, Row, Section, TreeView};
