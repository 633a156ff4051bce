//! Read-only views (status, history, weekly, stale)

use anyhow::Result;
use chrono::{DateTime, Duration, Local, Utc};

use super::output::Output;
use super::palette::Palette;
use crate::domain::query::{self, Week};
use crate::domain::{render, Group, RenderOptions, Row, TaskState};
use crate::storage::Workspace;

fn palette(workspace: &Workspace) -> Palette {
    Palette::for_stdout(workspace.config().display.glyphs)
}

/// Local calendar date of a timestamp
fn date(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Show tasks grouped by state
pub fn status(output: &Output, workspace: &Workspace) -> Result<()> {
    let board = workspace.load()?;
    let view = render(&board, RenderOptions::default());
    output.verbose_ctx(
        "status",
        &format!("{} tasks in {} groups", board.len(), view.sections.len()),
    );

    if output.is_json() {
        output.data(&view);
        return Ok(());
    }

    if view.is_empty() {
        println!("No tasks yet. Use 'wip add <title>' to add a task.");
        return Ok(());
    }

    let palette = palette(workspace);
    for (index, section) in view.sections.iter().enumerate() {
        if index > 0 {
            println!();
        }
        println!("{}", palette.heading(section.group));
        for row in &section.rows {
            println!("{}", format_row(&palette, section.group, row));
        }
    }

    Ok(())
}

fn format_row(palette: &Palette, group: Group, row: &Row) -> String {
    let title = match group {
        Group::Active if row.dimmed => palette.muted(&row.title),
        Group::Active => palette.title(&row.title),
        _ => row.title.clone(),
    };

    let mut line = if row.depth == 0 {
        format!("  {} {} {}", palette.glyph(row.state), palette.id(row.id), title)
    } else {
        format!(
            "  {}└─ {} {}",
            "   ".repeat(row.depth),
            palette.id(row.id),
            title
        )
    };

    if let Some(reason) = &row.hold_reason {
        line.push(' ');
        line.push_str(&palette.muted(&format!("({})", reason)));
    }

    line
}

/// Show completed tasks with their dates (`status --done`)
pub fn completed(output: &Output, workspace: &Workspace) -> Result<()> {
    let board = workspace.load()?;
    let done = board.list(Some(TaskState::Done));

    if output.is_json() {
        output.data(&done);
        return Ok(());
    }

    if done.is_empty() {
        println!("No completed tasks.");
        return Ok(());
    }

    println!("COMPLETED TASKS");
    println!("{:>6}  {:<40} {:<10}  {:<10}", "ID", "TITLE", "CREATED", "COMPLETED");
    println!("{}", "-".repeat(72));
    for task in done {
        let completed = task.completed_at.map(date).unwrap_or_else(|| "unknown".to_string());
        println!(
            "{:>6}  {:<40} {:<10}  {:<10}",
            task.id,
            task.title,
            date(task.created_at),
            completed
        );
    }

    Ok(())
}

/// Show recently completed tasks, newest first
pub fn history(output: &Output, workspace: &Workspace, count: usize) -> Result<()> {
    let board = workspace.load()?;
    let recent = query::history(&board, count);

    if output.is_json() {
        output.data(&recent);
        return Ok(());
    }

    if recent.is_empty() {
        println!("No completed tasks.");
        return Ok(());
    }

    let palette = palette(workspace);
    println!(
        "{}",
        palette.title(&format!("Recent History ({} task{})", recent.len(), plural(recent.len())))
    );
    for task in recent {
        println!(
            "  {} {} {}",
            palette.glyph(TaskState::Done),
            palette.id(task.id),
            task.title
        );
    }

    Ok(())
}

/// Show tasks completed this week, grouped by weekday
pub fn weekly(output: &Output, workspace: &Workspace) -> Result<()> {
    let board = workspace.load()?;
    let now = Local::now();
    let week = query::week(&board, &now);
    output.verbose_ctx("weekly", &format!("Week starts {}", week.start));

    if output.is_json() {
        output.data(&week_json(&week));
        return Ok(());
    }

    if week.total() == 0 {
        println!("No tasks completed this week.");
        return Ok(());
    }

    let palette = palette(workspace);
    let monday = week.start.with_timezone(&Local);
    let sunday = monday + Duration::days(6);
    println!(
        "{}",
        palette.title(&format!(
            "Week of {} - {}",
            monday.format("%b %d"),
            sunday.format("%b %d, %Y")
        ))
    );

    for day in week.days.iter().filter(|d| !d.tasks.is_empty()) {
        println!();
        println!("{}", palette.subheading(&day.weekday.to_string()));
        for task in &day.tasks {
            println!(
                "  {} {} {}",
                palette.glyph(TaskState::Done),
                palette.id(task.id),
                task.title
            );
        }
    }

    println!();
    println!(
        "{}",
        palette.muted(&format!("Total: {} task{} completed", week.total(), plural(week.total())))
    );

    Ok(())
}

fn week_json(week: &Week<'_>) -> serde_json::Value {
    let days: Vec<_> = week
        .days
        .iter()
        .map(|day| {
            serde_json::json!({
                "day": day.weekday.to_string(),
                "tasks": day.tasks,
            })
        })
        .collect();

    serde_json::json!({
        "week_start": week.start,
        "total": week.total(),
        "days": days,
    })
}

/// Show unfinished tasks older than the stale threshold
pub fn stale(output: &Output, workspace: &Workspace) -> Result<()> {
    let board = workspace.load()?;
    let stale_days = board.limits().stale_days;
    let tasks = query::stale(&board, Utc::now());

    if output.is_json() {
        output.data(&serde_json::json!({
            "stale_days": stale_days,
            "tasks": tasks,
        }));
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No stale tasks (older than {} days).", stale_days);
        return Ok(());
    }

    let palette = palette(workspace);
    println!(
        "{}",
        palette.title(&format!(
            "Stale Tasks ({} older than {} days)",
            tasks.len(),
            stale_days
        ))
    );
    for task in tasks {
        let detail = match task.hold_reason() {
            Some(reason) => format!("(created {}, {})", date(task.created_at), reason),
            None => format!("(created {})", date(task.created_at)),
        };
        println!(
            "  {} {} {} {}",
            stale_glyph(&palette, task.state),
            palette.id(task.id),
            task.title,
            palette.muted(&detail)
        );
    }

    Ok(())
}

fn stale_glyph(palette: &Palette, state: TaskState) -> &'static str {
    if state.is_held() {
        palette.glyph(state)
    } else {
        palette.stale_glyph()
    }
}
