use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, SubsecRound};
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use crate::error_helpers;

/// Timestamp embedded in backup names; zero-padded so names sort chronologically.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

const BACKUP_EXTENSION: &str = "bak";

/// One `<original-name>.<timestamp>.bak` file in the backup directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    pub path: PathBuf,
    pub original_name: String,
    pub timestamp: NaiveDateTime,
}

impl BackupEntry {
    /// Parse a backup path, returning None for anything that is not a well-formed backup name
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        let stem = name.strip_suffix(BACKUP_EXTENSION)?.strip_suffix('.')?;
        let (original_name, stamp) = stem.rsplit_once('.')?;

        if original_name.is_empty() {
            return None;
        }

        let timestamp = NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).ok()?;
        // Reject stamps chrono accepts but which would break name ordering (e.g. unpadded fields)
        if timestamp.format(TIMESTAMP_FORMAT).to_string() != stamp {
            return None;
        }

        Some(Self {
            path: path.to_path_buf(),
            original_name: original_name.to_string(),
            timestamp,
        })
    }

    /// File name of the backup itself
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Result of restoring a file from its most recent backup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    Restored(BackupEntry),
    NoBackup,
}

/// Flat directory of timestamped per-file backups
pub struct BackupStore {
    backup_dir: PathBuf,
}

impl BackupStore {
    /// The directory is created on the first backup, not here
    pub fn new(backup_dir: impl Into<PathBuf>) -> Self {
        Self {
            backup_dir: backup_dir.into(),
        }
    }

    /// Get the backup directory path
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copy the current bytes of `path` into the backup directory
    pub fn backup(&self, path: &Path) -> Result<BackupEntry> {
        self.backup_at(path, Local::now().naive_local())
    }

    /// Same as [`BackupStore::backup`] with an explicit timestamp.
    ///
    /// A second backup of the same file name within the same second replaces the first.
    pub fn backup_at(&self, path: &Path, timestamp: NaiveDateTime) -> Result<BackupEntry> {
        // Names carry whole seconds; the returned entry must equal the one parsed back
        let timestamp = timestamp.trunc_subsecs(0);
        let file_name = path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid file name: {}", path.display()))?
            .to_string_lossy()
            .into_owned();

        fs::create_dir_all(&self.backup_dir).map_err(|e| {
            anyhow::anyhow!(error_helpers::dir_create_error(&self.backup_dir, &e))
        })?;

        let backup_path = self.backup_dir.join(format!(
            "{}.{}.{}",
            file_name,
            timestamp.format(TIMESTAMP_FORMAT),
            BACKUP_EXTENSION
        ));

        copy_preserving_mtime(path, &backup_path)
            .with_context(|| format!("Failed to backup file: {}", path.display()))?;

        tracing::info!(
            source = %path.display(),
            backup = %backup_path.display(),
            "backup created"
        );

        Ok(BackupEntry {
            path: backup_path,
            original_name: file_name,
            timestamp,
        })
    }

    /// Every backup in the directory, newest name first.
    ///
    /// A missing backup directory simply means there are no backups yet.
    pub fn list(&self) -> Result<Vec<BackupEntry>> {
        if !self.backup_dir.exists() {
            return Ok(Vec::new());
        }

        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backup_dir).with_context(|| {
            format!(
                "Failed to read backups directory: {}",
                self.backup_dir.display()
            )
        })? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(backup) = BackupEntry::from_path(&entry.path()) {
                backups.push(backup);
            }
        }

        backups.sort_by_key(|b| std::cmp::Reverse(b.file_name()));
        Ok(backups)
    }

    /// Most recent backup whose original name matches the file name of `path`
    pub fn latest_backup(&self, path: &Path) -> Result<Option<BackupEntry>> {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            return Ok(None);
        };

        Ok(self
            .list()?
            .into_iter()
            .find(|b| b.original_name == file_name))
    }

    /// Overwrite `path` with its most recent backup.
    ///
    /// The backup is kept, so restoring twice yields the same bytes.
    pub fn restore(&self, path: &Path) -> Result<RestoreOutcome> {
        match self.latest_backup(path)? {
            Some(entry) => {
                self.restore_entry(&entry, path)?;
                Ok(RestoreOutcome::Restored(entry))
            }
            None => {
                tracing::info!(file = %path.display(), "no backup to restore");
                Ok(RestoreOutcome::NoBackup)
            }
        }
    }

    /// Copy a specific backup over `dest`
    pub fn restore_entry(&self, entry: &BackupEntry, dest: &Path) -> Result<()> {
        copy_preserving_mtime(&entry.path, dest)
            .with_context(|| format!("Failed to restore file: {}", dest.display()))?;

        tracing::info!(
            file = %dest.display(),
            backup = %entry.path.display(),
            "restored from backup"
        );
        Ok(())
    }
}

/// `fs::copy` carries permissions; the modification time is copied when the platform allows it.
fn copy_preserving_mtime(src: &Path, dest: &Path) -> Result<()> {
    fs::copy(src, dest)?;

    let modified = fs::metadata(src).and_then(|m| m.modified());
    let applied = modified.and_then(|time| {
        File::options()
            .write(true)
            .open(dest)
            .and_then(|f| f.set_modified(time))
    });
    if let Err(e) = applied {
        tracing::debug!(file = %dest.display(), error = %e, "could not preserve modification time");
    }

    Ok(())
}
