//! Working directory resolution.
//!
//! The clock checkout lives in a fixed place under the invoking user's home:
//! `/home/<user>/spotify-clock`.

use std::io;
use std::path::{Path, PathBuf};

use nix::unistd::{Uid, User};

/// Directory name of the clock checkout under the user's home.
const CHECKOUT_DIR: &str = "spotify-clock";

#[derive(Debug, thiserror::Error)]
pub enum WorkdirError {
    /// The invoking user could not be determined.
    #[error("could not determine current user")]
    UnknownUser,

    /// The directory does not exist or cannot be entered.
    #[error("cannot enter {path}: {source}")]
    DirectoryUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Login name of the effective user.
///
/// Looked up in the password database first; `$USER` is the fallback for
/// environments without one (minimal containers).
pub fn current_user() -> Result<String, WorkdirError> {
    let uid = Uid::effective();
    match User::from_uid(uid) {
        Ok(Some(user)) => return Ok(user.name),
        Ok(None) => tracing::warn!(uid = uid.as_raw(), "no passwd entry, falling back to $USER"),
        Err(e) => tracing::warn!(
            uid = uid.as_raw(),
            error = %e,
            "passwd lookup failed, falling back to $USER"
        ),
    }
    std::env::var("USER")
        .ok()
        .filter(|name| !name.is_empty())
        .ok_or(WorkdirError::UnknownUser)
}

/// The supervisor's default working directory for `user`.
pub fn default_workdir(user: &str) -> PathBuf {
    PathBuf::from("/home").join(user).join(CHECKOUT_DIR)
}

/// Change the process working directory to `path`.
///
/// Returns the canonical path that was entered.
pub fn enter(path: &Path) -> Result<PathBuf, WorkdirError> {
    let unavailable = |source| WorkdirError::DirectoryUnavailable {
        path: path.to_path_buf(),
        source,
    };

    let canonical = path.canonicalize().map_err(unavailable)?;
    std::env::set_current_dir(&canonical).map_err(unavailable)?;

    tracing::debug!(path = %canonical.display(), "entered working directory");
    Ok(canonical)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_workdir_uses_user() {
        assert_eq!(
            default_workdir("alice"),
            PathBuf::from("/home/alice/spotify-clock")
        );
    }

    #[test]
    fn test_current_user_is_not_empty() {
        let user = current_user().unwrap();
        assert!(!user.is_empty());
    }

    #[test]
    fn test_current_user_matches_passwd_entry() {
        // Only meaningful where the effective uid has a passwd entry
        if let Ok(Some(entry)) = User::from_uid(Uid::effective()) {
            assert_eq!(current_user().unwrap(), entry.name);
        }
    }

    #[test]
    fn test_enter_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");

        let err = enter(&missing).unwrap_err();
        match err {
            WorkdirError::DirectoryUnavailable { path, source } => {
                assert_eq!(path, missing);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("expected DirectoryUnavailable, got {:?}", other),
        }
    }

    #[test]
    fn test_enter_regular_file_fails() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            enter(file.path()),
            Err(WorkdirError::DirectoryUnavailable { .. })
        ));
    }
}
