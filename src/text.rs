//! Lenient line handling shared by the matcher and the line mutator
//!
//! Both sides must agree on what "line N" means, so the splitting rules live
//! here and nowhere else.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Read a file as text, replacing undecodable byte sequences instead of failing.
pub fn read_lossy(path: &Path) -> Result<String> {
    let bytes =
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Split text into lines, keeping each line's terminator.
pub fn split_lines(content: &str) -> Vec<String> {
    content.split_inclusive('\n').map(str::to_string).collect()
}

/// The line text without its terminator (`\n` or `\r\n`).
pub fn strip_terminator(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// The terminator a line carried, defaulting to `\n` for an unterminated last line.
pub fn terminator_of(line: &str) -> &'static str {
    if line.ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    }
}
