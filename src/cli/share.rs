//! Shareable markdown summary

use std::fmt::Display;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};

use super::output::Output;
use crate::domain::query::{self, Week};
use crate::domain::{render, Group, RenderOptions, Row, TreeView};
use crate::storage::Workspace;

/// Renders the board summary to stdout or `path`
pub fn run(output: &Output, workspace: &Workspace, path: Option<&Path>) -> Result<()> {
    let board = workspace.load()?;
    let now = Local::now();
    let view = render(&board, RenderOptions::default());
    let week = query::week(&board, &now);
    let markdown = to_markdown(&view, &week, &now);

    match path {
        Some(path) => {
            fs::write(path, &markdown)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if output.is_json() {
                output.data(&serde_json::json!({ "file": path.display().to_string() }));
            } else {
                output.success(&format!("Wrote summary to {}", path.display()));
            }
        }
        None if output.is_json() => {
            output.data(&serde_json::json!({ "markdown": markdown }));
        }
        None => print!("{}", markdown),
    }

    Ok(())
}

/// Formats a tree view and this week's completions as markdown
pub fn to_markdown<Tz>(view: &TreeView, week: &Week<'_>, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut lines = vec!["# WIP Status".to_string(), String::new()];

    for (group, heading) in [
        (Group::Active, "Top of Mind"),
        (Group::OnHold, "On Hold"),
        (Group::Backlog, "Backlog"),
    ] {
        let Some(section) = view.section(group) else {
            continue;
        };
        lines.push(format!("## {}", heading));
        lines.push(String::new());
        lines.extend(section.rows.iter().map(|row| markdown_row(group, row)));
        lines.push(String::new());
    }

    lines.push("## This Week".to_string());
    lines.push(String::new());
    if week.total() == 0 {
        lines.push("*No tasks completed this week*".to_string());
    } else {
        for day in &week.days {
            for task in &day.tasks {
                lines.push(format!("- **{}**: {}", day.weekday, task.title));
            }
        }
        lines.push(String::new());
        lines.push(format!("*{} completed*", week.total()));
    }

    lines.push(String::new());
    lines.push("---".to_string());
    lines.push(format!("*Updated: {}*", now.format("%Y-%m-%d %H:%M")));
    lines.push(String::new());

    lines.join("\n")
}

fn markdown_row(group: Group, row: &Row) -> String {
    let indent = "  ".repeat(row.depth);
    let text = match group {
        Group::Active if row.dimmed => format!("*[{}] {}*", row.id, row.title),
        Group::Active => format!("**[{}] {}**", row.id, row.title),
        _ => match &row.hold_reason {
            Some(reason) => format!("[{}] {} _{}_", row.id, row.title, reason),
            None => format!("[{}] {}", row.id, row.title),
        },
    };
    format!("{}- {}", indent, text)
}
