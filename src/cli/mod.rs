//! # Command-Line Interface
//!
//! User-facing CLI commands and output formatting. Commands load the board
//! through [`Workspace`](crate::storage::Workspace), call into the domain, and
//! save; they hold no graph or state logic of their own.
//!
//! ## Command Groups
//!
//! | Group | Purpose | Examples |
//! |-------|---------|----------|
//! | Tasks | Create and change tasks | `add`, `mark`, `link`, `unlink` |
//! | Views | Read-only displays | `status`, `history`, `weekly`, `stale` |
//! | Files | Export, import, clear | `save`, `load`, `reset` |
//! | Other | Settings and sharing | `config`, `share` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! wip --verbose status
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod palette;
mod task;
mod view;
mod config_cmd;
mod file_cmd;
mod share;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
pub use share::to_markdown;
