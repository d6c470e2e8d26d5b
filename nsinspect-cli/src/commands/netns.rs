//! Netns command implementation

use anyhow::{Context, Result};
use nsinspect_core::{Error, NetworkNamespaceSnapshot, ProcessId};
use nsinspect_namespace::{NetnsConfig, NetnsInspector};

pub async fn execute(config: NetnsConfig, pid: i32, json: bool) -> Result<()> {
    let pid = ProcessId::from_raw(pid);

    let snapshot = inspect_live(config, pid)
        .await?
        .map_err(|e| explain(e, pid))?;

    super::render(&snapshot, &format!("Network namespace of PID {pid}"), json)
}

/// Run a live inspection off the async runtime's worker threads
pub async fn inspect_live(
    config: NetnsConfig,
    pid: ProcessId,
) -> Result<nsinspect_core::Result<NetworkNamespaceSnapshot>> {
    tokio::task::spawn_blocking(move || NetnsInspector::new(config).inspect(pid))
        .await
        .context("Inspection task failed")
}

/// Attach a user-facing hint to a failed live inspection
pub fn explain(err: Error, pid: ProcessId) -> anyhow::Error {
    let denied = matches!(err, Error::PermissionDenied { .. });
    let hint = if denied && !nix::unistd::geteuid().is_root() {
        String::from("Must run as root. Try again with sudo")
    } else {
        format!("Failed to inspect network namespace of PID {pid}")
    };

    anyhow::Error::new(err).context(hint)
}
