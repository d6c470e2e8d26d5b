//! CNI result cache location

use nsinspect_core::ContainerId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default directory where libcni caches plugin results
pub const DEFAULT_RESULTS_DIR: &str = "/var/lib/cni/results";

/// Cache key of the default bridge network
pub const DEFAULT_NETWORK_KEY: &str = "bridge-default";

/// Interface the default bridge network attaches
pub const DEFAULT_IF_NAME: &str = "eth0";

/// Where to find cached CNI results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CniCacheConfig {
    /// Directory holding cached results
    pub results_dir: PathBuf,

    /// Network part of the cache file name
    pub network_key: String,

    /// Interface part of the cache file name
    pub if_name: String,
}

impl Default for CniCacheConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from(DEFAULT_RESULTS_DIR),
            network_key: DEFAULT_NETWORK_KEY.to_string(),
            if_name: DEFAULT_IF_NAME.to_string(),
        }
    }
}

impl CniCacheConfig {
    /// Create a new configuration for the default bridge network
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read results from a different directory
    #[must_use]
    pub fn with_results_dir(mut self, results_dir: impl Into<PathBuf>) -> Self {
        self.results_dir = results_dir.into();
        self
    }

    /// Read results cached for a different network
    #[must_use]
    pub fn with_network_key(mut self, network_key: impl Into<String>) -> Self {
        self.network_key = network_key.into();
        self
    }

    /// Read results cached for a different interface
    #[must_use]
    pub fn with_if_name(mut self, if_name: impl Into<String>) -> Self {
        self.if_name = if_name.into();
        self
    }

    /// Cache file of a container: `<results_dir>/<network_key>-<id>-<if_name>`
    #[must_use]
    pub fn result_path(&self, container_id: &ContainerId) -> PathBuf {
        let file_name = format!("{}-{}-{}", self.network_key, container_id, self.if_name);
        self.results_dir.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_result_path() {
        let id = ContainerId::new("c0ffee").unwrap();
        assert_eq!(
            CniCacheConfig::default().result_path(&id),
            PathBuf::from("/var/lib/cni/results/bridge-default-c0ffee-eth0")
        );
    }

    #[test]
    fn test_builder_pattern() {
        let config = CniCacheConfig::new()
            .with_results_dir("/tmp/cni")
            .with_network_key("mynet-default")
            .with_if_name("net1");

        let id = ContainerId::new("abc").unwrap();
        assert_eq!(
            config.result_path(&id),
            PathBuf::from("/tmp/cni/mynet-default-abc-net1")
        );
    }
}
