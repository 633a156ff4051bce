//! # Storage Layer
//!
//! Persistence for wip. Storage never contains graph or state logic; it only
//! moves [`Snapshot`](crate::domain::Snapshot)s and configuration to and from
//! disk.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Board | JSON | `<home>/state.json` |
//! | Config | TOML | `<home>/config.toml` |
//! | Backups | JSON | `<home>/backups/state_<YYYYmmdd_HHMMSS>.json` |
//!
//! `<home>` is `--home`, `$WIP_HOME`, or the platform data directory.
//!
//! ## Concurrency Safety
//!
//! - [`StateFile`] uses file locking (`fs2`) for concurrent access
//! - State writes are atomic (temp file + rename)

mod state;
mod config;
mod backup;
mod workspace;

pub use state::StateFile;
pub use config::{Config, ConfigError, DisplayConfig, GlyphStyle};
pub use backup::Backups;
pub use workspace::{Workspace, WorkspaceError};
