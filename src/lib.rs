//! wip - a personal task tracker with dependency-aware tree views
//!
//! Tasks move between backlog, active, on-hold and done. Dependency links
//! gate activation, holds cascade to dependents, and the board renders as a
//! grouped tree in the terminal or as shareable markdown.

pub mod domain;
pub mod storage;
pub mod cli;

pub use domain::{Board, Task, TaskId, TaskState};
