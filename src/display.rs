use colored::*;
use similar::{ChangeTag, TextDiff};
use std::io::IsTerminal;

use crate::backup_store::BackupEntry;
use crate::matcher::Match;

pub struct Display {
    use_color: bool,
}

impl Display {
    pub fn new(use_color: bool) -> Self {
        Self { use_color }
    }

    /// Auto-detect if we should use colors
    pub fn auto() -> Self {
        Self::new(Self::should_use_color())
    }

    fn should_use_color() -> bool {
        // Check NO_COLOR env var (https://no-color.org/)
        if std::env::var("NO_COLOR").is_ok() {
            return false;
        }

        std::io::stdout().is_terminal()
    }

    /// `<index>: File: <file> [Line <n>] => <line>`
    pub fn format_match(&self, m: &Match) -> String {
        if self.use_color {
            format!(
                "{}: File: {} [Line {}] => {}",
                m.index.to_string().bold(),
                m.file.display().to_string().cyan(),
                m.line_number,
                m.line
            )
        } else {
            format!(
                "{}: File: {} [Line {}] => {}",
                m.index,
                m.file.display(),
                m.line_number,
                m.line
            )
        }
    }

    /// Two-line before/after preview with the changed characters marked
    pub fn format_change(&self, original: &str, updated: &str) -> String {
        let diff = TextDiff::from_chars(original, updated);
        let mut before = String::new();
        let mut after = String::new();

        // Per-character changes are coalesced into runs so markers wrap whole spans
        let mut run: Option<(ChangeTag, String)> = None;
        for change in diff.iter_all_changes() {
            if let Some((tag, text)) = run.as_mut() {
                if *tag == change.tag() {
                    text.push_str(change.value());
                    continue;
                }
            }
            if let Some((tag, text)) = run.take() {
                self.flush_run(tag, &text, &mut before, &mut after);
            }
            run = Some((change.tag(), change.value().to_string()));
        }
        if let Some((tag, text)) = run {
            self.flush_run(tag, &text, &mut before, &mut after);
        }

        if self.use_color {
            format!("  {} {}\n  {} {}\n", "-".red().bold(), before, "+".green().bold(), after)
        } else {
            format!("  - {}\n  + {}\n", before, after)
        }
    }

    fn flush_run(&self, tag: ChangeTag, text: &str, before: &mut String, after: &mut String) {
        match tag {
            ChangeTag::Equal => {
                before.push_str(text);
                after.push_str(text);
            }
            ChangeTag::Delete => before.push_str(&self.mark(text, false)),
            ChangeTag::Insert => after.push_str(&self.mark(text, true)),
        }
    }

    fn mark(&self, value: &str, inserted: bool) -> String {
        match (self.use_color, inserted) {
            (true, true) => value.green().bold().to_string(),
            (true, false) => value.red().strikethrough().to_string(),
            (false, true) => format!("{{+{}+}}", value),
            (false, false) => format!("[-{}-]", value),
        }
    }

    /// One line of the rollback menu
    pub fn format_backup_choice(&self, number: usize, entry: &BackupEntry) -> String {
        let name = entry.file_name();
        if self.use_color {
            format!(
                "{}. Restore '{}' from backup: {}",
                number,
                entry.original_name.bold(),
                name.dimmed()
            )
        } else {
            format!(
                "{}. Restore '{}' from backup: {}",
                number, entry.original_name, name
            )
        }
    }

    pub fn success(&self, msg: &str) -> String {
        if self.use_color {
            msg.green().to_string()
        } else {
            msg.to_string()
        }
    }

    pub fn warning(&self, msg: &str) -> String {
        if self.use_color {
            msg.yellow().to_string()
        } else {
            msg.to_string()
        }
    }
}
