//! Grouped tree view of a board
//!
//! Tasks are partitioned by state. Active tasks form a forest in which a task
//! nests under its lowest-id active blocker; the other groups are flat lists
//! in ascending ID order. The view is a pure function of the board.

use std::collections::BTreeMap;

use serde::Serialize;

use super::board::Board;
use super::id::TaskId;
use super::task::{Task, TaskState};

/// Display group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Group {
    Active,
    OnHold,
    Backlog,
    Done,
}

impl Group {
    fn of(state: TaskState) -> Self {
        match state {
            TaskState::Active => Group::Active,
            TaskState::OnHold => Group::OnHold,
            TaskState::Backlog => Group::Backlog,
            TaskState::Done => Group::Done,
        }
    }
}

/// One rendered line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Row {
    pub id: TaskId,
    pub title: String,
    pub state: TaskState,
    pub depth: usize,
    /// Active task nested under another active task
    pub dimmed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hold_reason: Option<String>,
}

impl Row {
    fn new(task: &Task, depth: usize) -> Self {
        Self {
            id: task.id,
            title: task.title.clone(),
            state: task.state,
            depth,
            dimmed: task.state.is_active() && depth > 0,
            hold_reason: task.hold_reason().map(str::to_string),
        }
    }
}

/// Rows belonging to one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub group: Group,
    pub rows: Vec<Row>,
}

/// The full grouped view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeView {
    pub sections: Vec<Section>,
}

impl TreeView {
    /// Returns the section for a group, if it has any rows
    pub fn section(&self, group: Group) -> Option<&Section> {
        self.sections.iter().find(|s| s.group == group)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Rendering options
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Append the done group
    pub include_done: bool,
}

/// Computes the grouped view of `board`
pub fn render(board: &Board, options: RenderOptions) -> TreeView {
    let mut groups: BTreeMap<u8, Vec<&Task>> = BTreeMap::new();
    for task in board.tasks() {
        let order = match Group::of(task.state) {
            Group::Active => 0,
            Group::OnHold => 1,
            Group::Backlog => 2,
            Group::Done if options.include_done => 3,
            Group::Done => continue,
        };
        groups.entry(order).or_default().push(task);
    }

    let mut sections = Vec::new();
    for (_, tasks) in groups {
        let Some(first) = tasks.first() else {
            continue;
        };
        let group = Group::of(first.state);
        let rows = match group {
            Group::Active => active_forest(board, &tasks),
            _ => tasks.iter().map(|t| Row::new(t, 0)).collect(),
        };
        sections.push(Section { group, rows });
    }

    TreeView { sections }
}

/// Lays out active tasks as a forest, pre-order, ascending IDs at each level
fn active_forest(board: &Board, active: &[&Task]) -> Vec<Row> {
    let by_id: BTreeMap<TaskId, &Task> = active.iter().map(|t| (t.id, *t)).collect();

    let mut children: BTreeMap<TaskId, Vec<TaskId>> = BTreeMap::new();
    let mut roots = Vec::new();
    for task in active {
        let parent = board
            .blockers_of(task.id)
            .into_iter()
            .find(|b| by_id.contains_key(b));
        match parent {
            Some(parent) => children.entry(parent).or_default().push(task.id),
            None => roots.push(task.id),
        }
    }

    let mut rows = Vec::with_capacity(active.len());
    // Explicit stack; children pushed in reverse so the lowest ID pops first
    let mut stack: Vec<(TaskId, usize)> = roots.iter().rev().map(|id| (*id, 0)).collect();
    while let Some((id, depth)) = stack.pop() {
        if let Some(task) = by_id.get(&id) {
            rows.push(Row::new(task, depth));
        }
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().rev().map(|kid| (*kid, depth + 1)));
        }
    }

    rows
}
