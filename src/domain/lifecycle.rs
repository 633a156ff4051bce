//! Task lifecycle transitions
//!
//! ```text
//!            active               hold
//!   Backlog ───────→ Active    (any non-done) ───→ OnHold
//!      ↑               │                              │
//!      └───inactive────┘          Backlog ←─release───┘
//!
//!   (any non-done) ──done──→ Done
//! ```
//!
//! Holding a task cascades breadth-first onto its dependents. Releasing or
//! completing it reconsiders dependents whose hold was generated by a cascade;
//! holds placed by the user are never lifted automatically.

use std::collections::{HashSet, VecDeque};

use chrono::{DateTime, Utc};

use super::board::{Board, BoardError, Cascade};
use super::id::TaskId;
use super::task::{Hold, TaskState};

impl Board {
    /// Moves a backlog task to active
    ///
    /// Returns `false` if the task was already active.
    pub fn activate(&mut self, id: TaskId) -> Result<bool, BoardError> {
        let task = self.get(id)?;
        match task.state {
            TaskState::Active => return Ok(false),
            TaskState::Backlog => {}
            from => {
                return Err(BoardError::InvalidTransition {
                    id,
                    from,
                    action: "activate",
                })
            }
        }

        let blockers = self.open_blockers(id);
        if !blockers.is_empty() {
            return Err(BoardError::Blocked { id, blockers });
        }

        if self.active_count() >= self.limits.max_active as usize {
            return Err(BoardError::Capacity(self.limits.max_active));
        }

        self.get_mut(id)?.set_state(TaskState::Active, Utc::now());
        Ok(true)
    }

    /// Moves an active task back to the backlog
    ///
    /// Returns `false` if the task was already in the backlog.
    pub fn deactivate(&mut self, id: TaskId) -> Result<bool, BoardError> {
        let task = self.get(id)?;
        match task.state {
            TaskState::Backlog => Ok(false),
            TaskState::Active => {
                self.get_mut(id)?.set_state(TaskState::Backlog, Utc::now());
                Ok(true)
            }
            from => Err(BoardError::InvalidTransition {
                id,
                from,
                action: "deactivate",
            }),
        }
    }

    /// Puts a task on hold and cascades the hold onto its dependents
    ///
    /// Holding a task that is already on hold replaces its reason and makes the
    /// hold manual.
    pub fn hold(&mut self, id: TaskId, reason: Option<String>) -> Result<Cascade, BoardError> {
        let task = self.get(id)?;
        if task.state.is_complete() {
            return Err(BoardError::InvalidTransition {
                id,
                from: task.state,
                action: "hold",
            });
        }

        self.get_mut(id)?.put_on_hold(Hold::manual(reason));
        let dependents = self.graph.dependents_of(id);
        let mut cascade = self.cascade_hold_from(id, dependents.iter().copied());
        cascade.absorb(self.reconsider(dependents, Utc::now()));
        Ok(cascade)
    }

    /// Releases a held task to the backlog and reconsiders its dependents
    pub fn release(&mut self, id: TaskId) -> Result<Cascade, BoardError> {
        let task = self.get(id)?;
        if !task.state.is_held() {
            return Err(BoardError::InvalidTransition {
                id,
                from: task.state,
                action: "release",
            });
        }

        let now = Utc::now();
        self.get_mut(id)?.set_state(TaskState::Backlog, now);
        let dependents = self.graph.dependents_of(id);
        Ok(self.reconsider(dependents, now))
    }

    /// Marks a task done now
    pub fn complete(&mut self, id: TaskId) -> Result<Cascade, BoardError> {
        self.complete_at(id, Utc::now())
    }

    /// Marks a task done at `now` and reconsiders its dependents
    pub fn complete_at(&mut self, id: TaskId, now: DateTime<Utc>) -> Result<Cascade, BoardError> {
        let task = self.get(id)?;
        if task.state.is_complete() {
            return Err(BoardError::InvalidTransition {
                id,
                from: task.state,
                action: "complete",
            });
        }

        self.get_mut(id)?.set_state(TaskState::Done, now);
        let dependents = self.graph.dependents_of(id);
        Ok(self.reconsider(dependents, now))
    }

    /// Holds every active or backlog task reachable from `start`
    ///
    /// Only tasks newly put on hold propagate further; each task is visited once.
    pub(crate) fn cascade_hold_from(
        &mut self,
        root: TaskId,
        start: impl IntoIterator<Item = TaskId>,
    ) -> Cascade {
        let root_title = self
            .tasks
            .get(&root)
            .map(|t| t.title.clone())
            .unwrap_or_default();

        let mut cascade = Cascade::default();
        let mut visited: HashSet<TaskId> = HashSet::from([root]);
        let mut queue: VecDeque<TaskId> = start
            .into_iter()
            .filter(|id| visited.insert(*id))
            .collect();

        while let Some(id) = queue.pop_front() {
            let Some(task) = self.tasks.get_mut(&id) else {
                continue;
            };
            if !matches!(task.state, TaskState::Active | TaskState::Backlog) {
                continue;
            }

            task.put_on_hold(Hold::cascade(root, &root_title));
            cascade.held.push(id);

            for dependent in self.graph.dependents_of(id) {
                if visited.insert(dependent) {
                    queue.push_back(dependent);
                }
            }
        }

        cascade
    }

    /// Re-evaluates cascade holds starting at `start`
    ///
    /// A cascade-held task with no held blocker left returns to the backlog and
    /// its dependents are re-evaluated in turn. One that still has a held blocker
    /// stays on hold, pointing at the lowest-id held blocker's root; when that
    /// root changes, its dependents are re-evaluated too. Manual holds are kept
    /// but their dependents are re-evaluated, so roots never go stale behind them.
    pub(crate) fn reconsider(
        &mut self,
        start: impl IntoIterator<Item = TaskId>,
        now: DateTime<Utc>,
    ) -> Cascade {
        let mut cascade = Cascade::default();
        let mut queue: VecDeque<TaskId> = start.into_iter().collect();

        // Changes only flow along edges of an acyclic graph, so re-queueing terminates
        while let Some(id) = queue.pop_front() {
            let Some(hold) = self.tasks.get(&id).and_then(|t| t.hold.as_ref()) else {
                continue;
            };
            let Some(current_root) = hold.root() else {
                queue.extend(self.graph.dependents_of(id));
                continue;
            };

            let held_blocker = self
                .graph
                .blockers_of(id)
                .into_iter()
                .find(|b| self.tasks.get(b).is_some_and(|t| t.state.is_held()));

            match held_blocker {
                None => {
                    if let Some(task) = self.tasks.get_mut(&id) {
                        task.set_state(TaskState::Backlog, now);
                    }
                    cascade.released.push(id);
                    queue.extend(self.graph.dependents_of(id));
                }
                Some(blocker) => {
                    let root = self
                        .tasks
                        .get(&blocker)
                        .and_then(|t| t.hold.as_ref())
                        .and_then(Hold::root)
                        .unwrap_or(blocker);
                    if current_root == root {
                        continue;
                    }
                    let root_title = self
                        .tasks
                        .get(&root)
                        .map(|t| t.title.clone())
                        .unwrap_or_default();
                    if let Some(task) = self.tasks.get_mut(&id) {
                        task.put_on_hold(Hold::cascade(root, &root_title));
                    }
                    queue.extend(self.graph.dependents_of(id));
                }
            }
        }

        cascade
    }
}
