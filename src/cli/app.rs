//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::task::MarkAction;
use super::{config_cmd, file_cmd, share, task, view};
use crate::domain::TaskId;
use crate::storage::Workspace;

#[derive(Parser)]
#[command(name = "wip")]
#[command(author, version, about = "Personal task tracker with dependency-aware tree views")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Data directory (defaults to the platform data directory)
    #[arg(long, global = true, env = "WIP_HOME")]
    pub home: Option<PathBuf>,

    /// Defaults to `status`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new backlog task
    Add {
        /// Task title (multiple words are joined)
        #[arg(required = true, num_args = 1..)]
        title: Vec<String>,

        /// Add the task on hold, waiting on this person
        #[arg(long, short = 'b')]
        blocked: Option<String>,
    },

    /// Change a task's state: active, inactive, done, hold, release, gone
    ///
    /// Holding a task also holds everything that depends on it. Releasing or
    /// completing it releases dependents that were held only by the cascade.
    Mark {
        /// Task ID
        id: TaskId,

        /// Action to apply
        action: MarkAction,

        /// Who or what is holding the task (only with 'hold')
        #[arg(long)]
        by: Option<String>,
    },

    /// Make DEPENDENT wait for BLOCKER
    Link {
        /// Task that must be done first
        blocker: TaskId,

        /// Task that waits
        dependent: TaskId,
    },

    /// Remove a dependency
    Unlink {
        /// Task that must be done first
        blocker: TaskId,

        /// Task that waits
        dependent: TaskId,
    },

    /// Show tasks grouped by state
    Status {
        /// Show completed tasks with dates instead
        #[arg(long)]
        done: bool,
    },

    /// Show recently completed tasks
    History {
        /// Number of recent tasks to show
        #[arg(short = 'n', long = "count", default_value = "10")]
        count: usize,
    },

    /// Show tasks completed this week
    Weekly,

    /// Show unfinished tasks older than stale_days
    Stale,

    /// Show or set configuration values
    ///
    /// Keys: max_active (>= 1), stale_days (>= 0), glyphs (emoji | ascii)
    Config {
        /// Configuration key (omit to show all)
        key: Option<String>,

        /// New value (omit to show the current one)
        value: Option<String>,
    },

    /// Save all tasks to a file
    Save {
        /// Destination file
        file: PathBuf,
    },

    /// Load tasks from a file (current state is backed up first)
    Load {
        /// Source file
        file: PathBuf,

        /// Merge with existing tasks instead of replacing them
        #[arg(long)]
        merge: bool,
    },

    /// Clear all tasks (current state is backed up first)
    Reset,

    /// Render a shareable markdown summary
    Share {
        /// Write to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(cli.format, cli.verbose);

    output.verbose("wip starting");

    let mut workspace = Workspace::open(cli.home)?;
    output.verbose(&format!("Using data directory: {}", workspace.home().display()));

    match cli.command.unwrap_or(Commands::Status { done: false }) {
        Commands::Add { title, blocked } => {
            task::add(&output, &mut workspace, &title.join(" "), blocked.as_deref())?
        }
        Commands::Mark { id, action, by } => {
            output.verbose_ctx("mark", &format!("Task {}: {:?}", id, action));
            task::mark(&output, &mut workspace, id, action, by)?
        }
        Commands::Link { blocker, dependent } => {
            task::link(&output, &mut workspace, blocker, dependent)?
        }
        Commands::Unlink { blocker, dependent } => {
            task::unlink(&output, &mut workspace, blocker, dependent)?
        }

        Commands::Status { done: false } => view::status(&output, &workspace)?,
        Commands::Status { done: true } => view::completed(&output, &workspace)?,
        Commands::History { count } => view::history(&output, &workspace, count)?,
        Commands::Weekly => view::weekly(&output, &workspace)?,
        Commands::Stale => view::stale(&output, &workspace)?,

        Commands::Config { key, value } => {
            config_cmd::run(&output, &mut workspace, key.as_deref(), value.as_deref())?
        }

        Commands::Save { file } => file_cmd::save(&output, &workspace, &file)?,
        Commands::Load { file, merge } => file_cmd::load(&output, &mut workspace, &file, merge)?,
        Commands::Reset => file_cmd::reset(&output, &mut workspace)?,

        Commands::Share { output: path } => share::run(&output, &workspace, path.as_deref())?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
