//! Error helper functions for creating actionable error messages

use std::io;
use std::path::Path;

/// Check if an IO error is a permission denied error
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

/// Check if an IO error is a "not found" error
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

/// Find the innermost `io::Error` in an anyhow chain, if there is one
pub fn io_cause(err: &anyhow::Error) -> Option<&io::Error> {
    err.chain().find_map(|cause| cause.downcast_ref::<io::Error>())
}

/// One-line description of why a file could not be read during a search
pub fn describe_read_failure(path: &Path, err: &anyhow::Error) -> String {
    match io_cause(err) {
        Some(io_err) if is_permission_denied(io_err) => format!(
            "Permission denied (check permissions with: ls -l '{}')",
            path.display()
        ),
        Some(io_err) if is_not_found(io_err) => {
            "File disappeared while searching".to_string()
        }
        Some(io_err) => io_err.to_string(),
        None => format!("{:#}", err),
    }
}

/// Create an enhanced error message for backup directory creation failures
pub fn dir_create_error(path: &Path, underlying_err: &io::Error) -> String {
    let base = format!("Failed to create backup directory: '{}'", path.display());
    let parent = path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());

    if is_permission_denied(underlying_err) {
        format!(
            "{}\n\n\
             Cause: Permission denied\n\n\
             Possible fixes:\n\
             1. Check write permissions on '{}'\n\
             2. Use --backup-dir to specify a different location",
            base, parent
        )
    } else {
        format!("{}\n\nUnderlying error: {}", base, underlying_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::io::ErrorKind;

    #[test]
    fn test_is_permission_denied() {
        let perm_err = io::Error::new(ErrorKind::PermissionDenied, "access denied");
        assert!(is_permission_denied(&perm_err));

        let not_found_err = io::Error::new(ErrorKind::NotFound, "not found");
        assert!(!is_permission_denied(&not_found_err));
    }

    #[test]
    fn test_is_not_found() {
        let not_found_err = io::Error::new(ErrorKind::NotFound, "not found");
        assert!(is_not_found(&not_found_err));

        let perm_err = io::Error::new(ErrorKind::PermissionDenied, "access denied");
        assert!(!is_not_found(&perm_err));
    }

    #[test]
    fn test_describe_read_failure_finds_wrapped_io_error() {
        let path = Path::new("/tmp/locked.txt");
        let err = Err::<(), _>(io::Error::new(ErrorKind::PermissionDenied, "denied"))
            .context("Failed to read file: /tmp/locked.txt")
            .unwrap_err();

        let msg = describe_read_failure(path, &err);
        assert!(msg.contains("Permission denied"));
        assert!(msg.contains("/tmp/locked.txt"));
    }

    #[test]
    fn test_describe_read_failure_without_io_cause() {
        let err = anyhow::anyhow!("something odd");
        let msg = describe_read_failure(Path::new("x.txt"), &err);
        assert_eq!(msg, "something odd");
    }

    #[test]
    fn test_dir_create_error_formatting() {
        let path = Path::new("/root/backups");
        let err = io::Error::new(ErrorKind::PermissionDenied, "denied");
        let msg = dir_create_error(path, &err);
        assert!(msg.contains("Failed to create backup directory"));
        assert!(msg.contains("--backup-dir"));
    }
}
