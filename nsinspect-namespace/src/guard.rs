//! Scoped network namespace switching
//!
//! `setns(2)` changes the namespace of the calling thread only, so every
//! switch happens on a thread spawned for that purpose. The caller's thread
//! never changes namespace, and concurrent inspections cannot interfere.

use nix::errno::Errno;
use nix::sched::{CloneFlags, setns};
use nsinspect_core::{Error, Result};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Handle to the network namespace of the current thread
const THREAD_NETNS: &str = "/proc/thread-self/ns/net";

/// Keeps the current thread inside a network namespace until dropped
///
/// Dropping the guard moves the thread back to the namespace it was in
/// when [`NetnsGuard::enter`] was called.
#[derive(Debug)]
pub struct NetnsGuard {
    original: File,
    target: PathBuf,
}

impl NetnsGuard {
    /// Move the current thread into the network namespace at `path`
    ///
    /// # Errors
    /// Returns error if the path is missing, not accessible, not a network
    /// namespace, or if `setns(2)` is refused
    pub fn enter(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let original = File::open(THREAD_NETNS).map_err(|e| Error::Namespace {
            message: format!("Failed to open current network namespace: {e}"),
        })?;

        let target = File::open(path).map_err(|e| {
            debug!(path = %path.display(), error = %e, "Cannot open network namespace");
            Error::from_namespace_io(path, &e)
        })?;

        setns(&target, CloneFlags::CLONE_NEWNET).map_err(|e| {
            error!(
                path = %path.display(),
                error = %e,
                "Failed to enter network namespace"
            );
            match e {
                Errno::EPERM => Error::PermissionDenied {
                    operation: format!("setns {}", path.display()),
                },
                Errno::EINVAL => Error::Namespace {
                    message: format!("{} is not a network namespace", path.display()),
                },
                _ => Error::Namespace {
                    message: format!("Failed to enter {}: {e}", path.display()),
                },
            }
        })?;

        debug!(path = %path.display(), "Entered network namespace");

        Ok(Self {
            original,
            target: path.to_path_buf(),
        })
    }
}

impl Drop for NetnsGuard {
    fn drop(&mut self) {
        match setns(&self.original, CloneFlags::CLONE_NEWNET) {
            Ok(()) => debug!(path = %self.target.display(), "Left network namespace"),
            // The worker thread exits right after, so nothing else runs in
            // the wrong namespace.
            Err(e) => error!(
                path = %self.target.display(),
                error = %e,
                "Failed to restore original network namespace"
            ),
        }
    }
}

/// Run `f` inside the network namespace at `path`
///
/// `f` runs on a dedicated thread which enters the namespace, runs the
/// closure, and restores its namespace before the result is handed back.
///
/// # Errors
/// Returns the error from entering the namespace, the error returned by
/// `f`, or a namespace error if the worker thread panicked
pub fn with_netns_path<F, R>(path: &Path, f: F) -> Result<R>
where
    F: FnOnce() -> Result<R> + Send,
    R: Send,
{
    std::thread::scope(|scope| {
        let worker = scope.spawn(|| {
            let _guard = NetnsGuard::enter(path)?;
            f()
        });

        worker.join().unwrap_or_else(|_| {
            Err(Error::Namespace {
                message: format!("Worker for {} panicked", path.display()),
            })
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_namespace_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("1").join("ns").join("net");

        let result = with_netns_path(&path, || Ok(()));
        assert!(matches!(result, Err(Error::NamespaceNotFound { .. })));
    }

    #[test]
    fn test_closure_not_run_when_entry_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");
        let mut ran = false;

        let result = with_netns_path(&path, || {
            ran = true;
            Ok(())
        });

        assert!(result.is_err());
        assert!(!ran);
    }

    #[test]
    fn test_regular_file_is_not_a_namespace() {
        let file = tempfile::NamedTempFile::new().unwrap();

        let result = with_netns_path(file.path(), || Ok(42));
        let err = result.unwrap_err();
        assert!(err.is_namespace_unavailable());
    }

    fn thread_netns() -> Result<PathBuf> {
        Ok(std::fs::read_link(THREAD_NETNS)?)
    }

    #[test]
    #[ignore = "requires root"]
    fn test_enter_own_namespace_and_restore() {
        let before = thread_netns().unwrap();
        let path = PathBuf::from("/proc/self/ns/net");

        let inside = with_netns_path(&path, thread_netns).unwrap();

        assert_eq!(inside, before);
        assert_eq!(thread_netns().unwrap(), before);
    }
}
