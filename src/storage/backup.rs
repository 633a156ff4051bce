//! Timestamped backups of the state file
//!
//! Destructive commands (`load`, `reset`) copy `state.json` to
//! `backups/state_<YYYYmmdd_HHMMSS>.json` before touching it.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone};

/// Directory of state backups
pub struct Backups {
    dir: PathBuf,
}

impl Backups {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Copies `source` into the backup directory
    ///
    /// Returns `None` when there is nothing to back up. A second backup within
    /// the same second gets a numeric suffix instead of overwriting the first.
    pub fn create<Tz>(&self, source: &Path, now: &DateTime<Tz>) -> Result<Option<PathBuf>>
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        if !source.is_file() {
            return Ok(None);
        }

        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create backup directory: {}", self.dir.display()))?;

        let stamp = now.format("%Y%m%d_%H%M%S").to_string();
        let mut target = self.dir.join(format!("state_{}.json", stamp));
        let mut counter = 1;
        while target.exists() {
            target = self.dir.join(format!("state_{}_{}.json", stamp, counter));
            counter += 1;
        }

        fs::copy(source, &target).with_context(|| {
            format!(
                "Failed to back up {} to {}",
                source.display(),
                target.display()
            )
        })?;

        Ok(Some(target))
    }
}
