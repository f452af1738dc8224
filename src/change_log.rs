//! Append-only record of the textual changes made during one session
//!
//! Each record is four lines:
//!
//! ```text
//! [FILE]: /path/to/file.txt
//! [LINE]: 12
//! [CHANGE]:
//! !!**old text**!! --> !!**new text**!!
//! ------------------------------------------------------------
//! ```

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::backup_store::TIMESTAMP_FORMAT;

const SEPARATOR_WIDTH: usize = 60;

/// Write one change record to any writer
pub fn write_record<W: Write>(
    writer: &mut W,
    file: &Path,
    line_number: usize,
    original: &str,
    updated: &str,
) -> std::io::Result<()> {
    writeln!(writer, "[FILE]: {}", file.display())?;
    writeln!(writer, "[LINE]: {}", line_number)?;
    writeln!(
        writer,
        "[CHANGE]:\n!!**{}**!! --> !!**{}**!!",
        original.trim(),
        updated.trim()
    )?;
    writeln!(writer, "{}", "-".repeat(SEPARATOR_WIDTH))
}

/// Log file name for a session: `<timestamp>_<user>.log`
pub fn log_file_name(username: &str, started: NaiveDateTime) -> String {
    format!("{}_{}.log", started.format(TIMESTAMP_FORMAT), username)
}

/// The open log stream of one session
pub struct ChangeLog {
    path: PathBuf,
    writer: BufWriter<File>,
    records: usize,
}

impl ChangeLog {
    /// Open `<logs_dir>/<timestamp>_<user>.log` for appending, creating the directory if needed
    pub fn create(logs_dir: &Path, username: &str) -> Result<Self> {
        Self::create_at(logs_dir, username, Local::now().naive_local())
    }

    pub fn create_at(logs_dir: &Path, username: &str, started: NaiveDateTime) -> Result<Self> {
        fs::create_dir_all(logs_dir).with_context(|| {
            format!("Failed to create log directory: {}", logs_dir.display())
        })?;

        let path = logs_dir.join(log_file_name(username, started));
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open change log: {}", path.display()))?;

        tracing::debug!(log = %path.display(), "change log opened");
        Ok(Self {
            path,
            writer: BufWriter::new(file),
            records: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records appended so far
    pub fn records(&self) -> usize {
        self.records
    }

    /// Append one record; flushed immediately so an aborted session keeps what it logged
    pub fn append(
        &mut self,
        file: &Path,
        line_number: usize,
        original: &str,
        updated: &str,
    ) -> Result<()> {
        write_record(&mut self.writer, file, line_number, original, updated)
            .and_then(|_| self.writer.flush())
            .with_context(|| format!("Failed to write change log: {}", self.path.display()))?;
        self.records += 1;
        Ok(())
    }

    /// Flush and close the log, returning its path
    pub fn close(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to write change log: {}", self.path.display()))?;
        Ok(self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn started() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap()
    }

    #[test]
    fn test_write_record_format() {
        let mut out = Vec::new();
        write_record(&mut out, Path::new("/data/a.txt"), 7, "  old line ", "new line").unwrap();

        let expected = format!(
            "[FILE]: /data/a.txt\n[LINE]: 7\n[CHANGE]:\n!!**old line**!! --> !!**new line**!!\n{}\n",
            "-".repeat(60)
        );
        assert_eq!(String::from_utf8(out).unwrap(), expected);
    }

    #[test]
    fn test_log_file_name() {
        assert_eq!(log_file_name("alice", started()), "2024-01-02_03-04-05_alice.log");
    }

    #[test]
    fn test_create_makes_directory_and_file() {
        let temp_dir = TempDir::new().unwrap();
        let logs_dir = temp_dir.path().join("logs");

        let log = ChangeLog::create_at(&logs_dir, "bob", started()).unwrap();

        assert!(log.path().exists());
        assert_eq!(log.path(), logs_dir.join("2024-01-02_03-04-05_bob.log"));
    }

    #[test]
    fn test_append_and_close() {
        let temp_dir = TempDir::new().unwrap();
        let mut log = ChangeLog::create_at(temp_dir.path(), "bob", started()).unwrap();

        log.append(Path::new("a.txt"), 1, "x", "y").unwrap();
        log.append(Path::new("b.txt"), 2, "same", "same").unwrap();
        assert_eq!(log.records(), 2);

        let path = log.close().unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.matches("[FILE]: ").count(), 2);
        assert!(content.contains("!!**same**!! --> !!**same**!!"));
    }

    #[test]
    fn test_reopen_appends() {
        let temp_dir = TempDir::new().unwrap();

        let mut first = ChangeLog::create_at(temp_dir.path(), "u", started()).unwrap();
        first.append(Path::new("a.txt"), 1, "a", "b").unwrap();
        first.close().unwrap();

        let mut second = ChangeLog::create_at(temp_dir.path(), "u", started()).unwrap();
        second.append(Path::new("a.txt"), 1, "b", "c").unwrap();
        let path = second.close().unwrap();

        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.matches("[CHANGE]:").count(), 2);
    }
}
