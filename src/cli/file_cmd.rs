//! File commands (save, load, reset)

use std::path::Path;

use anyhow::{Context, Result};

use super::output::Output;
use crate::domain::Board;
use crate::storage::{StateFile, Workspace};

/// Writes the full board, limits included, to `file`
pub fn save(output: &Output, workspace: &Workspace, file: &Path) -> Result<()> {
    let board = workspace.load()?;
    StateFile::new(file).write(&board.snapshot())?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "file": file.display().to_string(),
            "tasks": board.len(),
        }));
    } else {
        output.success(&format!("Saved {} tasks to {}", board.len(), file.display()));
    }

    Ok(())
}

/// Replaces or merges the board with the contents of `file`
pub fn load(output: &Output, workspace: &mut Workspace, file: &Path, merge: bool) -> Result<()> {
    let snapshot = StateFile::new(file).read_required()?;
    let mut board = workspace.load()?;

    if merge {
        let report = board
            .merge(snapshot)
            .with_context(|| format!("Invalid state format in {}", file.display()))?;
        workspace.save(&board)?;

        if output.is_json() {
            let mapping: Vec<_> = report
                .mapping
                .iter()
                .map(|(from, to)| serde_json::json!({ "from": from, "to": to }))
                .collect();
            output.data(&serde_json::json!({
                "merged": report.tasks(),
                "edges": report.edges,
                "remapped": mapping,
            }));
        } else {
            output.success(&format!("Merged {} tasks from {}", report.tasks(), file.display()));
            if !report.mapping.is_empty() {
                output.line(&format!(
                    "Task IDs remapped: {} IDs reassigned",
                    report.mapping.len()
                ));
            }
        }
        return Ok(());
    }

    let loaded = Board::restore(snapshot, board.limits())
        .with_context(|| format!("Invalid state format in {}", file.display()))?;

    let backup = workspace.backup()?;
    workspace.save(&loaded)?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "loaded": loaded.len(),
            "backup": backup.map(|p| p.display().to_string()),
        }));
    } else {
        if let Some(path) = backup {
            output.line(&format!("Backup saved to: {}", path.display()));
        }
        output.success(&format!("Loaded {} tasks from {}", loaded.len(), file.display()));
    }

    Ok(())
}

/// Clears every task and edge; configuration and the ID counter survive
pub fn reset(output: &Output, workspace: &mut Workspace) -> Result<()> {
    let mut board = workspace.load()?;
    let backup = workspace.backup()?;
    let removed = board.reset();
    workspace.save(&board)?;

    output.verbose_ctx("reset", &format!("Removed {} tasks", removed));

    if output.is_json() {
        output.data(&serde_json::json!({
            "removed": removed,
            "backup": backup.map(|p| p.display().to_string()),
        }));
    } else {
        if let Some(path) = backup {
            output.line(&format!("Backup saved to: {}", path.display()));
        }
        output.success("State reset. All tasks cleared.");
    }

    Ok(())
}
