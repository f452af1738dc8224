//! Property-based tests for searchedit
//!
//! These use proptest to check the search, backup and edit invariants over
//! generated file contents.

use std::fs;
use std::path::Path;
use tempfile::TempDir;

use searchedit::{BackupStore, ChangeLog, EditAction, EditOutcome, LineMutator, search};

use proptest::prelude::*;

fn write_lines(dir: &Path, name: &str, lines: &[String]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut content = lines.join("\n");
    content.push('\n');
    fs::write(&path, content).unwrap();
    path
}

// ============================================================================
// Property 1: Matches address the exact line they report
// ============================================================================

proptest! {
    /// Every match's line_number is 1-based and its text equals that file line
    #[test]
    fn prop_match_points_at_its_line(
        lines in prop::collection::vec("[a-z ]{0,20}", 1..20),
        needle in "[a-z]{1,2}"
    ) {
        let temp_dir = TempDir::new().unwrap();
        let file = write_lines(temp_dir.path(), "data.txt", &lines);

        let results = search(temp_dir.path(), &needle);
        let expected = lines.iter().filter(|l| l.contains(needle.as_str())).count();
        prop_assert_eq!(results.len(), expected);

        for (i, m) in results.matches().iter().enumerate() {
            prop_assert_eq!(m.index, i + 1);
            prop_assert_eq!(&m.file, &file);
            prop_assert!(m.line_number >= 1);
            prop_assert_eq!(&m.line, &lines[m.line_number - 1]);
            prop_assert!(m.line.contains(needle.as_str()));
        }
    }
}

// ============================================================================
// Property 2: Restore reproduces the backed-up bytes, repeatedly
// ============================================================================

proptest! {
    /// backup, overwrite, restore, restore leaves the original bytes both times
    #[test]
    fn prop_restore_is_idempotent(
        original in prop::collection::vec(any::<u8>(), 0..512),
        replacement in prop::collection::vec(any::<u8>(), 0..512)
    ) {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("bytes.txt");
        fs::write(&file, &original).unwrap();
        let store = BackupStore::new(temp_dir.path().join("backups"));

        store.backup(&file).unwrap();
        fs::write(&file, &replacement).unwrap();

        store.restore(&file).unwrap();
        let first = fs::read(&file).unwrap();
        store.restore(&file).unwrap();
        let second = fs::read(&file).unwrap();

        prop_assert_eq!(&first, &original);
        prop_assert_eq!(&second, &original);
    }
}

// ============================================================================
// Property 3: Edits touch only the addressed line
// ============================================================================

proptest! {
    /// Replace-substring rewrites one line as str::replace would and leaves the rest alone
    #[test]
    fn prop_replace_changes_only_target_line(
        lines in prop::collection::vec("[a-c]{0,12}", 1..12),
        old in "[a-c]{1,2}",
        new in "[x-z]{0,3}",
        pick in any::<prop::sample::Index>()
    ) {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        let file = write_lines(&data_dir, "a.txt", &lines);

        // The empty needle matches every line
        let results = search(&data_dir, "");
        let m = results.get(pick.index(results.len()) + 1).unwrap().clone();

        let store = BackupStore::new(temp_dir.path().join("backups"));
        let mut log = ChangeLog::create(&temp_dir.path().join("logs"), "prop").unwrap();
        let action = EditAction::ReplaceSubstring { old: old.clone(), new: new.clone() };
        let outcome = LineMutator::new(&store).apply(&m, &action, &mut log).unwrap();

        let expected_line = lines[m.line_number - 1].replace(old.as_str(), new.as_str());
        prop_assert_eq!(
            outcome,
            EditOutcome::Modified {
                original: lines[m.line_number - 1].clone(),
                updated: expected_line.clone(),
            }
        );

        let after: Vec<String> = fs::read_to_string(&file)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        prop_assert_eq!(after.len(), lines.len());
        for (i, line) in after.iter().enumerate() {
            if i == m.line_number - 1 {
                prop_assert_eq!(line, &expected_line);
            } else {
                prop_assert_eq!(line, &lines[i]);
            }
        }
        prop_assert_eq!(log.records(), 1);
    }

    /// Delete-line keeps the line count and blanks exactly one line
    #[test]
    fn prop_delete_keeps_line_count(
        lines in prop::collection::vec("[a-z]{1,10}", 1..15),
        pick in any::<prop::sample::Index>()
    ) {
        let temp_dir = TempDir::new().unwrap();
        let data_dir = temp_dir.path().join("data");
        fs::create_dir_all(&data_dir).unwrap();
        let file = write_lines(&data_dir, "a.txt", &lines);
        let before = fs::read(&file).unwrap();

        let results = search(&data_dir, "");
        let m = results.get(pick.index(results.len()) + 1).unwrap().clone();

        let store = BackupStore::new(temp_dir.path().join("backups"));
        let mut log = ChangeLog::create(&temp_dir.path().join("logs"), "prop").unwrap();
        LineMutator::new(&store).apply(&m, &EditAction::DeleteLine, &mut log).unwrap();

        let after = fs::read_to_string(&file).unwrap();
        prop_assert_eq!(after.lines().count(), lines.len());
        prop_assert_eq!(after.lines().nth(m.line_number - 1), Some(""));

        // The backup taken before the edit restores the original bytes
        store.restore(&file).unwrap();
        prop_assert_eq!(fs::read(&file).unwrap(), before);
    }
}
