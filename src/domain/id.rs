//! Task identifiers
//!
//! IDs are plain positive integers handed out by the board's monotonic
//! counter. They print as the bare number and parse from either `7` or `#7`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum IdError {
    #[error("Invalid task ID: expected a positive number, got '{0}'")]
    InvalidTaskId(String),
}

/// Stable identifier of a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(u64);

impl TaskId {
    /// The first ID a fresh board hands out
    pub const FIRST: TaskId = TaskId(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the numeric value
    pub fn get(self) -> u64 {
        self.0
    }

    /// Returns the ID following this one
    ///
    /// `u64::MAX` is never handed out, so the counter can always be stored.
    pub fn next(self) -> Option<Self> {
        self.0
            .checked_add(1)
            .filter(|n| *n != u64::MAX)
            .map(Self)
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaskId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.trim().trim_start_matches('#');
        match digits.parse::<u64>() {
            Ok(0) | Err(_) => Err(IdError::InvalidTaskId(s.to_string())),
            Ok(n) => Ok(Self(n)),
        }
    }
}
