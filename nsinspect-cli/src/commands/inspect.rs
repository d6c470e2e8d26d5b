//! Inspect command implementation

use anyhow::{Context, Result};
use nsinspect_cni::CniCacheConfig;
use nsinspect_core::{ContainerId, ProcessId};
use nsinspect_namespace::NetnsConfig;
use tracing::{info, warn};

use super::{cni, netns};

pub async fn execute(
    netns_config: NetnsConfig,
    cni_config: CniCacheConfig,
    pid: i32,
    id: &str,
    json: bool,
) -> Result<()> {
    let container_id = ContainerId::new(id).context("Invalid container ID")?;
    let pid = ProcessId::from_raw(pid);

    match netns::inspect_live(netns_config, pid).await? {
        Ok(snapshot) => {
            info!(pid = %pid, container_id = %container_id, "Inspected live namespace");
            super::render(
                &snapshot,
                &format!("Network of container {container_id} (PID {pid})"),
                json,
            )
        }
        Err(e) if e.is_namespace_unavailable() => {
            warn!(
                pid = %pid,
                container_id = %container_id,
                error = %e,
                "Namespace unavailable, falling back to CNI result cache"
            );

            let snapshot = cni::read_cached(cni_config, container_id.clone())
                .await?
                .with_context(|| {
                    format!("Namespace of PID {pid} unavailable ({e}) and CNI cache unusable")
                })?;

            super::render(
                &snapshot,
                &format!("Network of container {container_id} (from CNI cache, approximate)"),
                json,
            )
        }
        Err(e) => Err(netns::explain(e, pid)),
    }
}
