//! Task domain model
//!
//! A task carries its lifecycle state and, while on hold, the reason and
//! provenance of that hold. State changes go through the board so that
//! guards and cascades are applied consistently.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::TaskId;

/// Lifecycle state of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    #[default]
    Backlog,
    Active,
    OnHold,
    Done,
}

impl TaskState {
    /// Returns true if this state represents completion
    pub fn is_complete(&self) -> bool {
        matches!(self, TaskState::Done)
    }

    /// Returns true if the task is currently being worked on
    pub fn is_active(&self) -> bool {
        matches!(self, TaskState::Active)
    }

    /// Returns true if the task is on hold
    pub fn is_held(&self) -> bool {
        matches!(self, TaskState::OnHold)
    }

    /// Returns the lowercase name used in messages and JSON output
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Backlog => "backlog",
            TaskState::Active => "active",
            TaskState::OnHold => "on_hold",
            TaskState::Done => "done",
        }
    }
}

impl std::fmt::Display for TaskState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a hold came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HoldOrigin {
    /// Placed by the user; never released automatically
    Manual,
    /// Propagated from the hold of `root`
    Cascade { root: TaskId },
}

/// Hold details, present exactly while a task is on hold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hold {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub origin: HoldOrigin,
}

impl Hold {
    /// Creates a user-placed hold
    pub fn manual(reason: Option<String>) -> Self {
        let reason = reason
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Self {
            reason,
            origin: HoldOrigin::Manual,
        }
    }

    /// Creates a cascade hold pointing at `root`
    pub fn cascade(root: TaskId, root_title: &str) -> Self {
        Self {
            reason: Some(format!("blocked by {}: {}", root, root_title)),
            origin: HoldOrigin::Cascade { root },
        }
    }

    /// Returns true if this hold was generated by a cascade
    pub fn is_cascade(&self) -> bool {
        matches!(self.origin, HoldOrigin::Cascade { .. })
    }

    /// Returns the cascade root, if any
    pub fn root(&self) -> Option<TaskId> {
        match self.origin {
            HoldOrigin::Cascade { root } => Some(root),
            HoldOrigin::Manual => None,
        }
    }
}

/// A tracked task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier
    pub id: TaskId,

    /// Human-readable title
    pub title: String,

    /// Current lifecycle state
    #[serde(default)]
    pub state: TaskState,

    /// Hold details (only while on hold)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<Hold>,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was completed (only while done)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new backlog task
    pub fn new(id: TaskId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            state: TaskState::Backlog,
            hold: None,
            created_at,
            completed_at: None,
        }
    }

    /// Returns the hold reason text, if on hold with a reason
    pub fn hold_reason(&self) -> Option<&str> {
        self.hold.as_ref().and_then(|h| h.reason.as_deref())
    }

    /// Returns true if the task is held by a cascade rather than by the user
    pub fn is_cascade_held(&self) -> bool {
        self.state.is_held() && self.hold.as_ref().is_some_and(Hold::is_cascade)
    }

    /// Returns true if the task is stale at `now` given a threshold in days
    pub fn is_stale(&self, now: DateTime<Utc>, stale_days: u32) -> bool {
        !self.state.is_complete() && self.created_at < now - chrono::Duration::days(stale_days.into())
    }

    /// Moves to a state other than on-hold, keeping `hold` and `completed_at` consistent
    pub(crate) fn set_state(&mut self, state: TaskState, now: DateTime<Utc>) {
        debug_assert!(state != TaskState::OnHold, "use put_on_hold");
        self.hold = None;
        self.completed_at = match state {
            TaskState::Done if self.state.is_complete() => self.completed_at,
            TaskState::Done => Some(now),
            _ => None,
        };
        self.state = state;
    }

    /// Moves to on-hold with the given hold details
    pub(crate) fn put_on_hold(&mut self, hold: Hold) {
        self.state = TaskState::OnHold;
        self.hold = Some(hold);
        self.completed_at = None;
    }

    /// Returns a copy carrying a different ID (used when merging imports)
    pub(crate) fn with_id(&self, id: TaskId) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}
