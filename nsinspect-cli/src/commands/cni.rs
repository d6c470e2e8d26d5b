//! Cni command implementation

use anyhow::{Context, Result};
use nsinspect_cni::{CniCacheConfig, CniResultReader};
use nsinspect_core::{ContainerId, NetworkNamespaceSnapshot};

pub async fn execute(config: CniCacheConfig, id: &str, json: bool) -> Result<()> {
    let container_id = ContainerId::new(id).context("Invalid container ID")?;

    let snapshot = read_cached(config, container_id.clone())
        .await?
        .with_context(|| format!("Failed to rebuild network of container {container_id}"))?;

    super::render(
        &snapshot,
        &format!("Network of container {container_id} (from CNI cache, approximate)"),
        json,
    )
}

/// Read a cached CNI result off the async runtime's worker threads
pub async fn read_cached(
    config: CniCacheConfig,
    container_id: ContainerId,
) -> Result<nsinspect_core::Result<NetworkNamespaceSnapshot>> {
    tokio::task::spawn_blocking(move || CniResultReader::new(config).read(&container_id))
        .await
        .context("CNI cache task failed")
}
