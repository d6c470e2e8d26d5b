//! Snapshot reconstruction from a cached CNI result

use nsinspect_core::{
    ContainerId, Error, InterfaceFlags, NetworkInterface, NetworkNamespaceSnapshot, Result,
};
use std::path::Path;
use tracing::{debug, info};

use crate::config::CniCacheConfig;
use crate::result::CniCacheEntry;

/// MTU reported for the synthesized loopback interface
pub const LOOPBACK_MTU: u32 = 65536;

/// MTU reported for the synthesized primary interface
pub const PRIMARY_MTU: u32 = 1500;

/// Rebuilds an approximate namespace view without entering the namespace
#[derive(Debug, Clone, Default)]
pub struct CniResultReader {
    config: CniCacheConfig,
}

impl CniResultReader {
    /// Create a new reader
    #[must_use]
    pub const fn new(config: CniCacheConfig) -> Self {
        Self { config }
    }

    /// Create a new reader with default config
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(CniCacheConfig::default())
    }

    /// Read and parse the cached result of a container
    ///
    /// # Errors
    /// Returns [`Error::CacheRead`] if the file cannot be read and
    /// [`Error::CacheParse`] if it is not a valid result
    pub fn read_entry(&self, container_id: &ContainerId) -> Result<CniCacheEntry> {
        load_entry(&self.config.result_path(container_id))
    }

    /// Reconstruct the network namespace snapshot of a container
    ///
    /// The snapshot always holds a loopback entry and the cached interface.
    /// The primary interface index is taken from the first IP assignment.
    ///
    /// # Errors
    /// Returns error if the cached result cannot be read or parsed, or has
    /// no IP assignment
    pub fn read(&self, container_id: &ContainerId) -> Result<NetworkNamespaceSnapshot> {
        let path = self.config.result_path(container_id);
        let entry = load_entry(&path)?;
        let snapshot = snapshot_from_entry(&entry, &path)?;

        info!(
            container_id = %container_id,
            primary = snapshot.primary_interface,
            "Reconstructed network namespace from CNI result"
        );

        Ok(snapshot)
    }
}

fn load_entry(path: &Path) -> Result<CniCacheEntry> {
    debug!(path = %path.display(), "Reading CNI result");

    let bytes = std::fs::read(path).map_err(|source| Error::CacheRead {
        path: path.to_path_buf(),
        source,
    })?;

    CniCacheEntry::parse(&bytes).map_err(|source| Error::CacheParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the two-interface snapshot described by a cache entry
///
/// # Errors
/// Returns [`Error::IncompleteResult`] if the entry has no IP assignment
pub fn snapshot_from_entry(entry: &CniCacheEntry, path: &Path) -> Result<NetworkNamespaceSnapshot> {
    let ip = entry.primary_ip().ok_or_else(|| Error::IncompleteResult {
        path: path.to_path_buf(),
        message: "result has no IP assignments".to_string(),
    })?;

    let primary = NetworkInterface {
        index: ip.interface,
        mtu: PRIMARY_MTU,
        name: entry.if_name.clone(),
        hardware_addr: entry.primary_mac().unwrap_or_default().to_string(),
        flags: InterfaceFlags::UP | InterfaceFlags::BROADCAST | InterfaceFlags::MULTICAST,
        addrs: vec![ip.address.clone()],
    };

    Ok(NetworkNamespaceSnapshot {
        interfaces: vec![loopback_interface(), primary],
        primary_interface: ip.interface,
    })
}

/// The loopback interface every container namespace starts with
#[must_use]
pub fn loopback_interface() -> NetworkInterface {
    NetworkInterface {
        index: 1,
        mtu: LOOPBACK_MTU,
        name: "lo".to_string(),
        hardware_addr: String::new(),
        flags: InterfaceFlags::UP | InterfaceFlags::LOOPBACK,
        addrs: vec!["127.0.0.1/8".to_string(), "::1/128".to_string()],
    }
}
