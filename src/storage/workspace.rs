//! Workspace management
//!
//! A workspace is the data directory holding the board state, configuration
//! and backups. It is opened once per invocation and passed explicitly.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use directories::ProjectDirs;
use thiserror::Error;

use super::{Backups, Config, StateFile};
use crate::domain::{Board, Snapshot};

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("Could not determine a data directory. Set WIP_HOME or pass --home.")]
    NoHome,
}

/// The wip data directory
pub struct Workspace {
    home: PathBuf,
    config: Config,
}

impl Workspace {
    /// Opens the workspace at `home`, or at the platform data directory
    pub fn open(home: Option<PathBuf>) -> Result<Self> {
        let home = match home {
            Some(home) => home,
            None => Self::default_home()?,
        };

        let config = Config::load(&home.join("config.toml"))?;

        Ok(Self { home, config })
    }

    /// Returns the platform data directory for wip
    pub fn default_home() -> Result<PathBuf> {
        ProjectDirs::from("", "", "wip")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| WorkspaceError::NoHome.into())
    }

    /// Returns the data directory path
    pub fn home(&self) -> &Path {
        &self.home
    }

    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    pub fn state_path(&self) -> PathBuf {
        self.home.join("state.json")
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.home.join("backups")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns a mutable reference to the configuration
    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    /// Writes the configuration back to `config.toml`
    pub fn save_config(&self) -> Result<()> {
        self.config.save(&self.config_path())
    }

    /// Loads the board, empty if nothing has been saved yet
    ///
    /// Limits always come from the configuration.
    pub fn load(&self) -> Result<Board> {
        let file = StateFile::new(self.state_path());
        let mut snapshot = file.read()?.unwrap_or_default();
        snapshot.limits = None;

        Board::restore(snapshot, self.config.limits)
            .with_context(|| format!("Invalid state in {}", file.path().display()))
    }

    /// Saves the board
    ///
    /// Limits are written to the configuration file when they differ from it,
    /// so `state.json` only ever carries tasks, edges and the ID counter.
    pub fn save(&mut self, board: &Board) -> Result<()> {
        let snapshot = Snapshot {
            limits: None,
            ..board.snapshot()
        };
        StateFile::new(self.state_path()).write(&snapshot)?;

        if board.limits() != self.config.limits {
            self.config.limits = board.limits();
            self.save_config()?;
        }

        Ok(())
    }

    /// Copies the current state into the backups directory
    pub fn backup(&self) -> Result<Option<PathBuf>> {
        Backups::new(self.backups_dir()).create(&self.state_path(), &Local::now())
    }
}
