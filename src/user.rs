//! Who is editing: used to name the session's change log
//!
//! Lookups never fail; anything that cannot be resolved becomes [`UNKNOWN_USER`].

use std::path::Path;

pub const UNKNOWN_USER: &str = "unknown";

/// Name of the user running the process
pub fn current_user() -> String {
    #[cfg(unix)]
    {
        // SAFETY: getuid has no preconditions and cannot fail.
        let uid = unsafe { libc::getuid() };
        if let Some(name) = user_name_for_uid(uid) {
            return name;
        }
    }

    ["USERNAME", "USER"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}

/// Name of the user owning `path`, falling back to [`current_user`]
pub fn file_owner(path: &Path) -> String {
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt;

        if let Some(name) = std::fs::metadata(path)
            .ok()
            .and_then(|m| user_name_for_uid(m.uid()))
        {
            return name;
        }
    }

    #[cfg(not(unix))]
    let _ = path;

    current_user()
}

#[cfg(unix)]
fn user_name_for_uid(uid: libc::uid_t) -> Option<String> {
    use std::ffi::CStr;

    // # Safety
    //
    // `getpwuid` returns either null or a pointer to a static passwd record that
    // stays valid until the next getpw* call. The name is copied out before this
    // function returns, and the tool does not call getpw* from other threads.
    unsafe {
        let entry = libc::getpwuid(uid);
        if entry.is_null() || (*entry).pw_name.is_null() {
            return None;
        }
        let name = CStr::from_ptr((*entry).pw_name).to_string_lossy().into_owned();
        (!name.is_empty()).then_some(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_current_user_is_never_empty() {
        assert!(!current_user().is_empty());
    }

    #[test]
    fn test_file_owner_of_own_file_is_current_user() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("mine.txt");
        std::fs::write(&path, "x").unwrap();

        assert_eq!(file_owner(&path), current_user());
    }

    #[test]
    fn test_file_owner_of_missing_file_falls_back() {
        let temp_dir = TempDir::new().unwrap();
        assert_eq!(file_owner(&temp_dir.path().join("missing")), current_user());
    }
}
