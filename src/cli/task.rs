//! Task CLI commands (add, mark, link, unlink)

use anyhow::Result;

use super::output::Output;
use crate::domain::{Board, Cascade, TaskId};
use crate::storage::Workspace;

/// Actions accepted by `wip mark`
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MarkAction {
    /// Start working on a backlog task
    Active,
    /// Return an active task to the backlog
    Inactive,
    /// Complete a task
    Done,
    /// Put a task on hold (with --by)
    Hold,
    /// Release a held task to the backlog
    Release,
    /// Delete a task entirely
    Gone,
}

pub fn add(
    output: &Output,
    workspace: &mut Workspace,
    title: &str,
    blocked: Option<&str>,
) -> Result<()> {
    let mut board = workspace.load()?;
    let task = match blocked {
        Some(blocker) => board.add_held(title, blocker)?.clone(),
        None => board.add(title)?.clone(),
    };
    workspace.save(&board)?;

    output.verbose_ctx("add", &format!("next_id is now {}", board.next_id()));

    if output.is_json() {
        output.data(&task);
    } else if let Some(blocker) = task.hold_reason() {
        output.success(&format!(
            "Added blocked task [{}]: {} (blocked by: {})",
            task.id, task.title, blocker
        ));
    } else {
        output.success(&format!("Added task [{}]: {}", task.id, task.title));
    }

    Ok(())
}

pub fn mark(
    output: &Output,
    workspace: &mut Workspace,
    id: TaskId,
    action: MarkAction,
    by: Option<String>,
) -> Result<()> {
    if by.is_some() && action != MarkAction::Hold {
        anyhow::bail!("--by only applies to 'hold'");
    }

    let mut board = workspace.load()?;
    let title = board.get(id)?.title.clone();

    let (changed, cascade, message) = match action {
        MarkAction::Active => {
            let changed = board.activate(id)?;
            let message = if changed {
                format!("Marked task [{}] as active", id)
            } else {
                format!("Task {} is already active", id)
            };
            (changed, Cascade::default(), message)
        }
        MarkAction::Inactive => {
            let changed = board.deactivate(id)?;
            let message = if changed {
                format!("Marked task [{}] as inactive", id)
            } else {
                format!("Task {} is not active", id)
            };
            (changed, Cascade::default(), message)
        }
        MarkAction::Done => {
            let cascade = board.complete(id)?;
            (true, cascade, format!("Completed task [{}]: {}", id, title))
        }
        MarkAction::Hold => {
            let cascade = board.hold(id, by)?;
            let message = match board.get(id)?.hold_reason() {
                Some(reason) => format!("Task [{}] on hold ({})", id, reason),
                None => format!("Task [{}] on hold", id),
            };
            (true, cascade, message)
        }
        MarkAction::Release => {
            let cascade = board.release(id)?;
            (true, cascade, format!("Released task [{}]: {}", id, title))
        }
        MarkAction::Gone => {
            let (_, cascade) = board.delete(id)?;
            (true, cascade, format!("Task [{}] gone: {}", id, title))
        }
    };

    if changed {
        workspace.save(&board)?;
    } else {
        output.verbose_ctx("mark", "No change; state not written");
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "id": id,
            "action": format!("{:?}", action).to_lowercase(),
            "changed": changed,
            "state": board.get(id).ok().map(|t| t.state),
            "held": cascade.held,
            "released": cascade.released,
        }));
    } else {
        output.success(&message);
        report_cascade(output, &board, &cascade);
    }

    Ok(())
}

pub fn link(
    output: &Output,
    workspace: &mut Workspace,
    blocker: TaskId,
    dependent: TaskId,
) -> Result<()> {
    let mut board = workspace.load()?;
    let cascade = board.link(blocker, dependent)?;
    workspace.save(&board)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "blocker": blocker,
            "dependent": dependent,
            "held": cascade.held,
        }));
    } else {
        output.success(&format!("Linked: [{}] -> [{}]", blocker, dependent));
        report_cascade(output, &board, &cascade);
    }

    Ok(())
}

pub fn unlink(
    output: &Output,
    workspace: &mut Workspace,
    blocker: TaskId,
    dependent: TaskId,
) -> Result<()> {
    let mut board = workspace.load()?;
    let existed = board.has_edge(blocker, dependent);
    let cascade = board.unlink(blocker, dependent);

    if existed {
        workspace.save(&board)?;
    } else {
        output.verbose_ctx("unlink", "Edge not present; nothing to do");
    }

    if output.is_json() {
        output.data(&serde_json::json!({
            "blocker": blocker,
            "dependent": dependent,
            "removed": existed,
            "released": cascade.released,
        }));
    } else {
        output.success(&format!("Unlinked: [{}] -> [{}]", blocker, dependent));
        report_cascade(output, &board, &cascade);
    }

    Ok(())
}

/// Lists the tasks a cascade touched (text mode)
fn report_cascade(output: &Output, board: &Board, cascade: &Cascade) {
    for id in &cascade.held {
        if let Ok(task) = board.get(*id) {
            let reason = task.hold_reason().unwrap_or("cascade");
            output.line(&format!("  Task [{}] on hold ({})", id, reason));
        }
    }
    for id in &cascade.released {
        if let Ok(task) = board.get(*id) {
            output.line(&format!("  Released task [{}]: {}", id, task.title));
        }
    }
}
