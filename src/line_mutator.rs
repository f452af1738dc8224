use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::backup_store::{BackupEntry, BackupStore, RestoreOutcome};
use crate::change_log::ChangeLog;
use crate::matcher::Match;
use crate::text;

/// What to do with a matched line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditAction {
    /// Replace every literal occurrence of `old` with `new` within the line
    ReplaceSubstring { old: String, new: String },
    /// Blank the line, keeping its line break
    DeleteLine,
    /// Replace the whole line
    RewriteLine(String),
    /// Restore the file from its latest backup
    RollBack,
    /// An action code that is not on the menu
    Unknown(String),
}

/// Menu codes as typed by the user, without the payload of actions 1 and 3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionCode {
    ReplaceSubstring,
    DeleteLine,
    RewriteLine,
    RollBack,
}

impl ActionCode {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::ReplaceSubstring),
            "2" => Some(Self::DeleteLine),
            "3" => Some(Self::RewriteLine),
            "4" => Some(Self::RollBack),
            _ => None,
        }
    }
}

/// Final state of one `apply` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
    Modified { original: String, updated: String },
    Deleted { original: String },
    Rewritten { original: String, updated: String },
    RolledBack(BackupEntry),
    /// Roll-back requested but there was nothing to restore
    NoBackup,
    /// Unknown action; the file was not written
    Skipped,
}

impl EditOutcome {
    /// Whether the outcome wrote a change record
    pub fn is_content_edit(&self) -> bool {
        matches!(
            self,
            Self::Modified { .. } | Self::Deleted { .. } | Self::Rewritten { .. }
        )
    }
}

/// Applies edit actions to single lines, backing each file up first
pub struct LineMutator<'a> {
    store: &'a BackupStore,
}

impl<'a> LineMutator<'a> {
    pub fn new(store: &'a BackupStore) -> Self {
        Self { store }
    }

    /// Apply `action` to the line addressed by `m`.
    ///
    /// The file is re-read from disk, so earlier edits in the same session are
    /// seen. A backup is taken before any content edit; roll-back restores
    /// without taking one. Errors abort the edit with the file untouched when
    /// they happen before the write.
    pub fn apply(
        &self,
        m: &Match,
        action: &EditAction,
        log: &mut ChangeLog,
    ) -> Result<EditOutcome> {
        if *action == EditAction::RollBack {
            return self.roll_back(&m.file);
        }

        let content = text::read_lossy(&m.file)?;
        let mut lines = text::split_lines(&content);

        let slot = m
            .line_number
            .checked_sub(1)
            .filter(|&i| i < lines.len())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "{}: line {} is out of range ({} lines)",
                    m.file.display(),
                    m.line_number,
                    lines.len()
                )
            })?;

        self.store.backup(&m.file)?;

        let original = text::strip_terminator(&lines[slot]).to_string();
        let (updated, outcome) = match action {
            EditAction::ReplaceSubstring { old, new } => {
                let updated = original.replace(old.as_str(), new.as_str());
                let outcome = EditOutcome::Modified {
                    original: original.clone(),
                    updated: updated.clone(),
                };
                (updated, outcome)
            }
            EditAction::DeleteLine => (
                String::new(),
                EditOutcome::Deleted {
                    original: original.clone(),
                },
            ),
            EditAction::RewriteLine(line) => (
                line.clone(),
                EditOutcome::Rewritten {
                    original: original.clone(),
                    updated: line.clone(),
                },
            ),
            EditAction::Unknown(_) | EditAction::RollBack => {
                tracing::warn!(action = ?action, file = %m.file.display(), "invalid edit option");
                return Ok(EditOutcome::Skipped);
            }
        };

        let terminator = text::terminator_of(&lines[slot]);
        lines[slot] = format!("{}{}", updated, terminator);
        fs::write(&m.file, lines.concat())
            .with_context(|| format!("Failed to write file: {}", m.file.display()))?;

        log.append(&m.file, m.line_number, &original, &updated)?;

        tracing::info!(
            file = %m.file.display(),
            line = m.line_number,
            "line updated"
        );
        Ok(outcome)
    }

    fn roll_back(&self, file: &Path) -> Result<EditOutcome> {
        match self.store.restore(file)? {
            RestoreOutcome::Restored(entry) => Ok(EditOutcome::RolledBack(entry)),
            RestoreOutcome::NoBackup => Ok(EditOutcome::NoBackup),
        }
    }
}
