//! Interactive flow: directory choice, search, selection, per-match action,
//! and the rollback menu
//!
//! The session reads answers from any `BufRead` and writes prompts to any
//! `Write`, so the binary wires it to stdin/stdout and tests feed it scripts.

use anyhow::Result;
use std::collections::HashSet;
use std::fmt;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::backup_store::BackupStore;
use crate::change_log::ChangeLog;
use crate::config::Paths;
use crate::display::Display;
use crate::line_mutator::{ActionCode, EditAction, EditOutcome, LineMutator};
use crate::matcher::{Matcher, SearchResults};
use crate::saved_dirs::SavedDirectories;
use crate::user;

/// How a session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    NoMatches,
    /// The typed search root is not a directory; the process should exit non-zero
    InvalidDirectory(String),
    /// An edit failed; the remaining selections were not processed
    EditAborted,
}

pub struct Session<R, W> {
    input: R,
    output: W,
    paths: Paths,
    matcher: Matcher,
    store: BackupStore,
    saved_dirs: SavedDirectories,
    display: Display,
}

impl<R: BufRead, W: Write> Session<R, W> {
    pub fn new(input: R, output: W, paths: Paths, matcher: Matcher, display: Display) -> Self {
        let store = BackupStore::new(&paths.backup_dir);
        let saved_dirs = SavedDirectories::new(&paths.saved_dirs_file);
        Self {
            input,
            output,
            paths,
            matcher,
            store,
            saved_dirs,
            display,
        }
    }

    /// Give back the output stream, e.g. to inspect what a scripted session printed
    pub fn into_output(self) -> W {
        self.output
    }

    /// Top-level menu: edit files or roll back from backups
    pub fn run_main_menu(&mut self) -> Result<SessionOutcome> {
        writeln!(self.output, "\nWhat would you like to do?")?;
        writeln!(self.output, "1. Edit files")?;
        writeln!(self.output, "2. Rollback files from backup")?;

        match self.prompt("Select 1 or 2: ")?.trim() {
            "1" => self.run_edit(),
            "2" => self.run_rollback(),
            _ => {
                writeln!(self.output, "Invalid selection. Exiting.")?;
                Ok(SessionOutcome::Completed)
            }
        }
    }

    /// Choose a directory, search it, and edit the selected matches
    pub fn run_edit(&mut self) -> Result<SessionOutcome> {
        let root = match self.select_directory()? {
            DirectoryChoice::Selected(root) => root,
            DirectoryChoice::Invalid(typed) => {
                writeln!(self.output, "Invalid directory. Exiting.")?;
                return Ok(SessionOutcome::InvalidDirectory(typed));
            }
        };

        let needle = self.prompt("Enter the string to search for: ")?.trim().to_string();
        tracing::info!(root = %root.display(), needle = %needle, "searching");
        let results = self.matcher.search(&root, &needle);

        for failure in results.failures() {
            writeln!(
                self.output,
                "{}",
                self.display.warning(&format!(
                    "Could not read {}: {}",
                    failure.file.display(),
                    failure.message
                ))
            )?;
        }

        if results.is_empty() {
            writeln!(self.output, "No matches found.")?;
            return Ok(SessionOutcome::NoMatches);
        }

        for m in results.matches() {
            writeln!(self.output, "{}", self.display.format_match(m))?;
        }

        let selection =
            self.prompt("\nEnter number(s) of the lines to modify (comma-separated): ")?;
        let selected = parse_selection(&selection);
        if selected.is_empty() {
            writeln!(self.output, "No lines selected.")?;
            return Ok(SessionOutcome::Completed);
        }

        self.edit_selected(&results, &selected)
    }

    fn edit_selected(
        &mut self,
        results: &SearchResults,
        selected: &[Pick],
    ) -> Result<SessionOutcome> {
        let owner = results
            .matches()
            .first()
            .map(|m| user::file_owner(&m.file))
            .unwrap_or_else(user::current_user);
        let mut log = ChangeLog::create(&self.paths.logs_dir, &owner)?;

        writeln!(
            self.output,
            "\nOptions:\n1. Edit part of the string\n2. Delete the line\n3. Manually edit the whole line\n4. Roll back from latest backup"
        )?;

        let mut outcome = SessionOutcome::Completed;
        for pick in selected {
            let m = match pick {
                Pick::Number(index) => results.get(*index),
                Pick::TooLarge(_) => None,
            };
            let Some(m) = m else {
                writeln!(self.output, "Invalid selection: {}", pick)?;
                continue;
            };

            writeln!(self.output, "\nSelected: {} [Line {}]", m.file.display(), m.line_number)?;
            writeln!(self.output, "Line content: {}", m.line)?;
            let action = self.read_action()?;

            let mutator = LineMutator::new(&self.store);
            match mutator.apply(m, &action, &mut log) {
                Ok(result) => self.report(&m.file, &result)?,
                Err(e) => {
                    tracing::warn!(file = %m.file.display(), error = %e, "edit aborted");
                    writeln!(
                        self.output,
                        "{}",
                        self.display.warning(&format!(
                            "Error editing {}: {:#}\nRemaining selections were not processed.",
                            m.file.display(),
                            e
                        ))
                    )?;
                    outcome = SessionOutcome::EditAborted;
                    break;
                }
            }
        }

        let log_path = log.close()?;
        writeln!(self.output, "\nEdits completed. Log saved to: {}", log_path.display())?;
        Ok(outcome)
    }

    /// Prompt for an action code and whatever payload it needs
    fn read_action(&mut self) -> Result<EditAction> {
        let code = self.prompt("Choose an action [1-4]: ")?;
        let action = match ActionCode::parse(&code) {
            Some(ActionCode::ReplaceSubstring) => {
                let old = self.prompt("Enter value to replace: ")?;
                let new = self.prompt("Enter new value: ")?;
                EditAction::ReplaceSubstring { old, new }
            }
            Some(ActionCode::DeleteLine) => EditAction::DeleteLine,
            Some(ActionCode::RewriteLine) => {
                EditAction::RewriteLine(self.prompt("Enter new line: ")?)
            }
            Some(ActionCode::RollBack) => {
                writeln!(self.output, "Rolling back from latest backup...")?;
                EditAction::RollBack
            }
            None => EditAction::Unknown(code.trim().to_string()),
        };
        Ok(action)
    }

    fn report(&mut self, file: &Path, outcome: &EditOutcome) -> Result<()> {
        match outcome {
            EditOutcome::Modified { original, updated }
            | EditOutcome::Rewritten { original, updated } => {
                write!(self.output, "{}", self.display.format_change(original, updated))?;
                let updated = self.display.success(&format!("Updated: {}", file.display()));
                writeln!(self.output, "{}", updated)?;
            }
            EditOutcome::Deleted { original } => {
                write!(self.output, "{}", self.display.format_change(original, ""))?;
                let updated = self.display.success(&format!("Updated: {}", file.display()));
                writeln!(self.output, "{}", updated)?;
            }
            EditOutcome::RolledBack(entry) => {
                writeln!(
                    self.output,
                    "{}",
                    self.display.success(&format!("Restored from backup: {}", entry.path.display()))
                )?;
            }
            EditOutcome::NoBackup => {
                writeln!(self.output, "{}", self.display.warning("No backup found to restore."))?;
            }
            EditOutcome::Skipped => {
                writeln!(self.output, "{}", self.display.warning("Invalid option. Skipping."))?;
            }
        }
        Ok(())
    }

    fn select_directory(&mut self) -> Result<DirectoryChoice> {
        writeln!(self.output, "Use default directory ({})?", self.paths.data_dir.display())?;
        let use_default = self
            .prompt("Type 'y' for yes, or any other key to choose another directory: ")?
            .trim()
            .to_lowercase();
        if use_default == "y" {
            return Ok(DirectoryChoice::Selected(self.paths.data_dir.clone()));
        }

        let saved = match self.saved_dirs.load() {
            Ok(saved) => saved,
            Err(e) => {
                writeln!(self.output, "{}", self.display.warning(&format!("{:#}", e)))?;
                Vec::new()
            }
        };

        if !saved.is_empty() {
            writeln!(self.output, "\nSaved Directories:")?;
            for (i, dir) in saved.iter().enumerate() {
                writeln!(self.output, "{}. {}", i + 1, dir)?;
            }
            writeln!(self.output, "{}. Specify a new directory", saved.len() + 1)?;

            let choice = self.prompt("Select a number from the menu: ")?;
            if let Ok(n) = choice.trim().parse::<usize>() {
                if (1..=saved.len()).contains(&n) {
                    return Ok(DirectoryChoice::Selected(PathBuf::from(&saved[n - 1])));
                }
            }
        }

        let typed = self
            .prompt("Enter the full path to the directory you want to search: ")?
            .trim()
            .to_string();
        if !Path::new(&typed).is_dir() {
            return Ok(DirectoryChoice::Invalid(typed));
        }

        let save = self
            .prompt("Would you like to save this directory for future use? (y/n): ")?
            .trim()
            .to_lowercase();
        if save == "y" {
            if let Err(e) = self.saved_dirs.add(&typed) {
                writeln!(self.output, "{}", self.display.warning(&format!("{:#}", e)))?;
            }
        }

        Ok(DirectoryChoice::Selected(PathBuf::from(typed)))
    }

    /// List every backup and restore the chosen ones into the data directory
    pub fn run_rollback(&mut self) -> Result<SessionOutcome> {
        writeln!(
            self.output,
            "\nRollback: Restore from latest backups in {}",
            self.store.backup_dir().display()
        )?;

        let backups = self.store.list()?;
        if backups.is_empty() {
            writeln!(self.output, "No backups available.")?;
            return Ok(SessionOutcome::Completed);
        }

        writeln!(self.output, "\nAvailable backups:")?;
        for (i, entry) in backups.iter().enumerate() {
            writeln!(self.output, "{}", self.display.format_backup_choice(i + 1, entry))?;
        }

        let choice = self.prompt(
            "\nEnter number(s) to restore (comma-separated), or 'a' to restore all: ",
        )?;
        let chosen: Vec<Pick> = if choice.trim().eq_ignore_ascii_case("a") {
            // Newest first, so the first entry per original name is its latest backup
            let mut seen = HashSet::new();
            backups
                .iter()
                .enumerate()
                .filter(|(_, entry)| seen.insert(entry.original_name.clone()))
                .map(|(i, _)| Pick::Number(i + 1))
                .collect()
        } else {
            parse_selection(&choice)
        };

        for pick in chosen {
            let entry = match &pick {
                Pick::Number(number) => number.checked_sub(1).and_then(|i| backups.get(i)),
                Pick::TooLarge(_) => None,
            };
            let Some(entry) = entry else {
                writeln!(self.output, "Invalid selection: {}", pick)?;
                continue;
            };

            let dest = self.paths.data_dir.join(&entry.original_name);
            match self.store.restore_entry(entry, &dest) {
                Ok(()) => writeln!(
                    self.output,
                    "{}",
                    self.display.success(&format!(
                        "Restored {} from {}",
                        entry.original_name,
                        entry.file_name()
                    ))
                )?,
                Err(e) => writeln!(
                    self.output,
                    "{}",
                    self.display.warning(&format!("{:#}", e))
                )?,
            }
        }

        Ok(SessionOutcome::Completed)
    }

    /// Print `message`, then read one line without its terminator. End of input reads as empty.
    fn prompt(&mut self, message: &str) -> Result<String> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        let answer = line.strip_suffix('\n').unwrap_or(&line);
        Ok(answer.strip_suffix('\r').unwrap_or(answer).to_string())
    }
}

enum DirectoryChoice {
    Selected(PathBuf),
    Invalid(String),
}

/// One number from a comma-separated selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick {
    Number(usize),
    /// All digits but past `usize::MAX`; reported as an invalid selection
    TooLarge(String),
}

impl fmt::Display for Pick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pick::Number(n) => write!(f, "{}", n),
            Pick::TooLarge(token) => f.write_str(token),
        }
    }
}

/// Comma-separated numbers; tokens that are not plain digits are ignored
pub fn parse_selection(input: &str) -> Vec<Pick> {
    input
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()))
        .map(|token| match token.parse() {
            Ok(n) => Pick::Number(n),
            Err(_) => Pick::TooLarge(token.to_string()),
        })
        .collect()
}
