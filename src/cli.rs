use clap::{Parser, Subcommand};

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "

License: MIT
Rust Edition: 2024"
);

#[derive(Parser)]
#[command(name = "searchedit")]
#[command(about = "Interactive search-and-replace for text files with automatic backups and rollback")]
#[command(long_about = "searchedit finds lines containing a string in the .txt files under a
directory and lets you edit them one by one.

Every edit backs the file up first, and every change is recorded in a
per-session change log, so any edit can be rolled back.

ACTIONS (per selected line):
  1  Edit part of the string (replace all occurrences within the line)
  2  Delete the line (the line is blanked, not removed)
  3  Manually edit the whole line
  4  Roll back from the latest backup

EXAMPLES:
  searchedit                        Main menu (edit or roll back)
  searchedit edit                   Go straight to searching and editing
  searchedit rollback               Restore files from the backup directory
  searchedit --backup-dir /mnt/bak  Keep backups somewhere else
  searchedit config --show          Show configuration and resolved paths")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_version = LONG_VERSION)]
#[command(propagate_version = true)]
struct Cli {
    /// Default directory to search (and to restore into)
    #[arg(long, value_name = "DIR", global = true)]
    data_dir: Option<String>,

    /// Custom backup directory
    #[arg(long, value_name = "DIR", global = true)]
    #[arg(help = "Use custom directory for backups\nDefault: <data-dir>/backups")]
    backup_dir: Option<String>,

    /// Write diagnostic logs to ~/.searchedit/searchedit.log
    #[arg(long, global = true)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search and edit files
    #[command(long_about = "Choose a directory, search its text files, and edit matching lines.

Skips the main menu. Each selected line is backed up before it is changed.")]
    Edit,

    /// Restore files from backups
    #[command(long_about = "List every backup and restore the chosen ones.

Files are restored into the data directory under their original names.
Enter 'a' to restore the newest backup of every file.")]
    Rollback,

    /// Create, validate, or show the configuration file
    #[command(long_about = "Manage ~/.searchedit/config.toml.

Without --show, writes a default configuration file if none exists and
validates the existing one.

CONFIGURATION OPTIONS:
  [paths]
    data_dir = \"/path\"          # Default search directory
    backup_dir = \"/path\"        # Backup directory
    logs_dir = \"/path\"          # Change log directory
    saved_dirs_file = \"/path\"   # Saved search directories (JSON)

  [search]
    extension = \"txt\"           # File extension to search

  [logging]
    debug = false                # Diagnostic logging")]
    Config {
        /// Show current configuration without editing
        #[arg(long = "show")]
        show: bool,
    },
}

/// What the binary should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Menu,
    Edit,
    Rollback,
    Config { show: bool },
}

#[derive(Debug)]
pub struct Args {
    pub mode: Mode,
    pub data_dir: Option<String>,
    pub backup_dir: Option<String>,
    pub debug: bool,
}

pub fn parse_args() -> Args {
    from_cli(Cli::parse())
}

fn from_cli(cli: Cli) -> Args {
    let mode = match cli.command {
        None => Mode::Menu,
        Some(Commands::Edit) => Mode::Edit,
        Some(Commands::Rollback) => Mode::Rollback,
        Some(Commands::Config { show }) => Mode::Config { show },
    };

    Args {
        mode,
        data_dir: cli.data_dir,
        backup_dir: cli.backup_dir,
        debug: cli.debug,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        from_cli(Cli::try_parse_from(args).unwrap())
    }

    #[test]
    fn test_no_subcommand_is_menu() {
        let args = parse(&["searchedit"]);
        assert_eq!(args.mode, Mode::Menu);
        assert!(!args.debug);
        assert!(args.backup_dir.is_none());
    }

    #[test]
    fn test_subcommands() {
        assert_eq!(parse(&["searchedit", "edit"]).mode, Mode::Edit);
        assert_eq!(parse(&["searchedit", "rollback"]).mode, Mode::Rollback);
        assert_eq!(
            parse(&["searchedit", "config", "--show"]).mode,
            Mode::Config { show: true }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = parse(&["searchedit", "edit", "--backup-dir", "/mnt/bak", "--debug"]);
        assert_eq!(args.mode, Mode::Edit);
        assert_eq!(args.backup_dir.as_deref(), Some("/mnt/bak"));
        assert!(args.debug);
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        assert!(Cli::try_parse_from(["searchedit", "frobnicate"]).is_err());
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
