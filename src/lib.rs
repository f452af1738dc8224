//! searchedit: interactive search-and-replace with per-edit backups
//!
//! This library exposes the search, backup, edit and change-log building
//! blocks for use in tests. The main binary is at src/main.rs.

pub mod backup_store;
pub mod change_log;
pub mod cli;
pub mod config;
pub mod display;
pub mod error_helpers;
pub mod line_mutator;
pub mod logger;
pub mod matcher;
pub mod saved_dirs;
pub mod session;
pub mod text;
pub mod user;

// Re-export commonly used types for convenience
pub use backup_store::{BackupEntry, BackupStore, RestoreOutcome};
pub use change_log::ChangeLog;
pub use config::{Config, Paths};
pub use line_mutator::{EditAction, EditOutcome, LineMutator};
pub use matcher::{Match, Matcher, SearchResults, search};
pub use saved_dirs::SavedDirectories;
pub use session::{Session, SessionOutcome};
