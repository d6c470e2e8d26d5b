//! Namespace lookup configuration

use nsinspect_core::ProcessId;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default mount point of procfs
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Where to find per-process network namespace handles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetnsConfig {
    /// Root of the proc filesystem
    pub proc_root: PathBuf,
}

impl Default for NetnsConfig {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from(DEFAULT_PROC_ROOT),
        }
    }
}

impl NetnsConfig {
    /// Create a new configuration with the default proc root
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different proc root (e.g. a host `/proc` mounted elsewhere)
    #[must_use]
    pub fn with_proc_root(mut self, proc_root: impl Into<PathBuf>) -> Self {
        self.proc_root = proc_root.into();
        self
    }

    /// Get the proc root
    #[must_use]
    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }

    /// Network namespace handle of a process: `<proc_root>/<pid>/ns/net`
    #[must_use]
    pub fn namespace_path(&self, pid: ProcessId) -> PathBuf {
        self.proc_root
            .join(pid.as_raw().to_string())
            .join("ns")
            .join("net")
    }
}
