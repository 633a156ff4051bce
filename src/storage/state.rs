//! JSON storage for board snapshots
//!
//! The board lives in `state.json` as a single JSON document. The same format
//! is used by `save`/`load` for export files. Reads take a shared lock, writes
//! go through a locked temp file followed by an atomic rename.

use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fs2::FileExt;

use crate::domain::Snapshot;

/// A snapshot file on disk
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path to the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the snapshot, or `None` if the file does not exist
    pub fn read(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)
            .with_context(|| format!("Failed to open state file: {}", self.path.display()))?;

        file.lock_shared()
            .context("Failed to acquire read lock on state file")?;

        let snapshot = serde_json::from_reader(BufReader::new(&file))
            .with_context(|| format!("Failed to parse state file: {}", self.path.display()))?;

        Ok(Some(snapshot))
    }

    /// Reads the snapshot, failing if the file does not exist
    pub fn read_required(&self) -> Result<Snapshot> {
        self.read()?
            .ok_or_else(|| anyhow::anyhow!("File not found: {}", self.path.display()))
    }

    /// Writes the snapshot (full rewrite)
    pub fn write(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let temp_path = self.path.with_extension("json.tmp");

        {
            let file = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&temp_path)
                .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

            file.lock_exclusive()
                .context("Failed to acquire write lock on state file")?;

            let mut writer = BufWriter::new(&file);
            serde_json::to_writer_pretty(&mut writer, snapshot)
                .context("Failed to serialize state")?;
            writeln!(writer).context("Failed to write state")?;
            writer.flush().context("Failed to flush state file")?;
        }

        fs::rename(&temp_path, &self.path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                temp_path.display(),
                self.path.display()
            )
        })?;

        Ok(())
    }
}
