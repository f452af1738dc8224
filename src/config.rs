/// Configuration management for searchedit
///
/// searchedit stores configuration in ~/.searchedit/config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::matcher::DEFAULT_EXTENSION;

const APP_DIR_NAME: &str = ".searchedit";

/// searchedit configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where data, backups, logs and saved directories live
    #[serde(default)]
    pub paths: PathsConfig,

    /// Search settings
    #[serde(default)]
    pub search: SearchConfig,

    /// Diagnostic logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Default directory to search (and to restore into from the rollback menu)
    #[serde(default)]
    pub data_dir: Option<String>,

    /// Flat directory holding `<name>.<timestamp>.bak` files
    #[serde(default)]
    pub backup_dir: Option<String>,

    /// Directory for per-session change logs
    #[serde(default)]
    pub logs_dir: Option<String>,

    /// JSON list of previously used search roots
    #[serde(default)]
    pub saved_dirs_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// File extension to search, without the dot (matched case-insensitively)
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            extension: default_extension(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Write diagnostic logs to ~/.searchedit/searchedit.log
    #[serde(default)]
    pub debug: bool,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

/// Every location the tool reads or writes, fully resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub data_dir: PathBuf,
    pub backup_dir: PathBuf,
    pub logs_dir: PathBuf,
    pub saved_dirs_file: PathBuf,
}

impl Paths {
    /// Default layout under `app_dir`
    pub fn under(app_dir: &Path) -> Self {
        let data_dir = app_dir.join("data_files");
        Self {
            backup_dir: data_dir.join("backups"),
            data_dir,
            logs_dir: app_dir.join("logs"),
            saved_dirs_file: app_dir.join("saved_dirs.json"),
        }
    }
}

impl Config {
    /// Resolve configured paths against the defaults under `app_dir`.
    ///
    /// A configured data directory moves the default backup directory with it.
    pub fn resolve_paths(&self, app_dir: &Path) -> Paths {
        let defaults = Paths::under(app_dir);
        let data_dir = self
            .paths
            .data_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or(defaults.data_dir);

        Paths {
            backup_dir: self
                .paths
                .backup_dir
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir.join("backups")),
            data_dir,
            logs_dir: self
                .paths
                .logs_dir
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or(defaults.logs_dir),
            saved_dirs_file: self
                .paths
                .saved_dirs_file
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or(defaults.saved_dirs_file),
        }
    }
}

/// Get the application directory (~/.searchedit), creating it if needed
pub fn app_dir() -> Result<PathBuf> {
    let home_dir =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;

    let app_dir = home_dir.join(APP_DIR_NAME);
    fs::create_dir_all(&app_dir)
        .with_context(|| format!("Failed to create config directory: {}", app_dir.display()))?;

    Ok(app_dir)
}

/// Get the default configuration file content with comments
fn get_default_config_content() -> &'static str {
    r#"# searchedit Configuration File
#
# Values set here can be overridden by command-line flags.

[paths]
# Default directory to search (default: ~/.searchedit/data_files)
#data_dir = "/srv/data_files"

# Backup directory (default: <data_dir>/backups)
#backup_dir = "/mnt/backups/searchedit"

# Change log directory (default: ~/.searchedit/logs)
#logs_dir = "/var/log/searchedit"

# Saved search directories (default: ~/.searchedit/saved_dirs.json)
#saved_dirs_file = "/srv/searchedit/saved_dirs.json"

[search]
# File extension to search, without the dot (default: "txt")
extension = "txt"

[logging]
# Write diagnostic logs to ~/.searchedit/searchedit.log (default: false)
debug = false
"#
}

/// Write the default commented configuration file to `path`
pub fn save_default_config(path: &Path) -> Result<()> {
    fs::write(path, get_default_config_content())
        .with_context(|| format!("Failed to write default config file: {}", path.display()))?;

    Ok(())
}

/// Load configuration from `path`, creating default if needed
///
/// If the config file doesn't exist, creates it with defaults and returns them.
/// If the config file is malformed, recreates it with defaults.
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        save_default_config(path)?;
    }

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = match toml::from_str(&config_str) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                file = %path.display(),
                error = %e,
                "malformed config replaced with defaults"
            );
            save_default_config(path)?;
            return Ok(Config::default());
        }
    };

    Ok(config)
}

/// Validate configuration values
pub fn validate_config(config: &Config) -> Result<()> {
    let ext = &config.search.extension;
    if ext.trim().is_empty() {
        anyhow::bail!("Invalid extension: must not be empty");
    }
    if ext.contains('.') || ext.contains(std::path::MAIN_SEPARATOR) {
        anyhow::bail!("Invalid extension: {} (give it without a dot, e.g. \"txt\")", ext);
    }

    for (name, value) in [
        ("data_dir", &config.paths.data_dir),
        ("backup_dir", &config.paths.backup_dir),
        ("logs_dir", &config.paths.logs_dir),
        ("saved_dirs_file", &config.paths.saved_dirs_file),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            anyhow::bail!("Invalid {}: must not be empty when set", name);
        }
    }

    Ok(())
}
