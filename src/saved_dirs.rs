/// Previously used search roots, persisted as a JSON list of paths

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct SavedDirectories {
    path: PathBuf,
}

impl SavedDirectories {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the saved list; a missing file is an empty list
    pub fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let json = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read saved directories: {}", self.path.display()))?;
        serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse saved directories: {}", self.path.display()))
    }

    /// Append `dir` unless it is already saved. Returns whether the list changed.
    pub fn add(&self, dir: &str) -> Result<bool> {
        let mut saved = self.load()?;
        if saved.iter().any(|d| d == dir) {
            return Ok(false);
        }

        saved.push(dir.to_string());
        self.save(&saved)?;
        Ok(true)
    }

    fn save(&self, dirs: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(dirs)
            .context("Failed to serialize saved directories")?;
        fs::write(&self.path, json).with_context(|| {
            format!("Failed to write saved directories: {}", self.path.display())
        })?;

        tracing::debug!(
            file = %self.path.display(),
            count = dirs.len(),
            "saved directories updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (SavedDirectories, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let repo = SavedDirectories::new(temp_dir.path().join("state/saved_dirs.json"));
        (repo, temp_dir)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (repo, _temp_dir) = create_test_repo();
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_add_appends_in_order() {
        let (repo, _temp_dir) = create_test_repo();

        assert!(repo.add("/srv/one").unwrap());
        assert!(repo.add("/srv/two").unwrap());

        assert_eq!(repo.load().unwrap(), vec!["/srv/one", "/srv/two"]);
    }

    #[test]
    fn test_add_deduplicates() {
        let (repo, _temp_dir) = create_test_repo();

        assert!(repo.add("/srv/one").unwrap());
        assert!(!repo.add("/srv/one").unwrap());

        assert_eq!(repo.load().unwrap().len(), 1);
    }

    #[test]
    fn test_file_is_pretty_json_list() {
        let (repo, _temp_dir) = create_test_repo();
        repo.add("/srv/one").unwrap();

        let raw = fs::read_to_string(repo.path()).unwrap();
        assert_eq!(raw, "[\n  \"/srv/one\"\n]");
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let (repo, _temp_dir) = create_test_repo();
        fs::create_dir_all(repo.path().parent().unwrap()).unwrap();
        fs::write(repo.path(), "{ not a list").unwrap();

        assert!(repo.load().is_err());
    }
}
