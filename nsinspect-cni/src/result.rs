//! Cached CNI result records
//!
//! `PascalCase` keys are canonical. The `camelCase` keys libcni writes are
//! accepted too, and absent or `null` fields read as empty.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One cached CNI ADD result, as persisted per container and interface
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CniCacheEntry {
    /// Cache record kind
    #[serde(alias = "kind", deserialize_with = "nullable::deserialize")]
    pub kind: String,

    /// Container the result belongs to
    #[serde(alias = "containerId", deserialize_with = "nullable::deserialize")]
    pub container_id: String,

    /// Network configuration the plugin ran with (opaque)
    #[serde(alias = "config", deserialize_with = "nullable::deserialize")]
    pub config: String,

    /// Interface name inside the container
    #[serde(alias = "ifName", deserialize_with = "nullable::deserialize")]
    pub if_name: String,

    /// Network name
    #[serde(alias = "networkName", deserialize_with = "nullable::deserialize")]
    pub network_name: String,

    /// Plugin result payload
    #[serde(alias = "result", deserialize_with = "nullable::deserialize")]
    pub result: CniResult,
}

/// Result payload returned by the plugin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CniResult {
    /// CNI protocol version
    #[serde(alias = "cniVersion", deserialize_with = "nullable::deserialize")]
    pub cni_version: String,

    /// DNS settings; shape is plugin defined
    #[serde(alias = "dns", deserialize_with = "nullable::deserialize")]
    pub dns: BTreeMap<String, Value>,

    /// Interfaces created by the plugin
    #[serde(alias = "interfaces", deserialize_with = "nullable::deserialize")]
    pub interfaces: Vec<CniInterface>,

    /// IP assignments
    #[serde(alias = "ips", deserialize_with = "nullable::deserialize")]
    pub ips: Vec<CniIp>,

    /// Routes installed
    #[serde(alias = "routes", deserialize_with = "nullable::deserialize")]
    pub routes: Vec<CniRoute>,
}

/// Interface descriptor in a CNI result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CniInterface {
    /// Hardware address
    #[serde(alias = "mac", deserialize_with = "nullable::deserialize")]
    pub mac: String,

    /// Interface name
    #[serde(alias = "name", deserialize_with = "nullable::deserialize")]
    pub name: String,

    /// Namespace path the interface lives in, empty for host interfaces
    #[serde(alias = "sandbox", deserialize_with = "nullable::deserialize")]
    pub sandbox: String,
}

/// IP assignment in a CNI result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CniIp {
    /// Address in CIDR notation
    #[serde(alias = "address", deserialize_with = "nullable::deserialize")]
    pub address: String,

    /// Gateway address
    #[serde(alias = "gateway", deserialize_with = "nullable::deserialize")]
    pub gateway: String,

    /// Interface reference of the assignment
    #[serde(alias = "interface", deserialize_with = "nullable::deserialize")]
    pub interface: u32,
}

/// Route in a CNI result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CniRoute {
    /// Destination in CIDR notation
    #[serde(alias = "dst", deserialize_with = "nullable::deserialize")]
    pub dst: String,
}

impl CniCacheEntry {
    /// Parse a cache record from raw JSON
    ///
    /// # Errors
    /// Returns error if the bytes are not JSON of the expected shape
    pub fn parse(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// First IP assignment of the result
    #[must_use]
    pub fn primary_ip(&self) -> Option<&CniIp> {
        self.result.ips.first()
    }

    /// Hardware address of the first result interface named like the
    /// cached interface
    #[must_use]
    pub fn primary_mac(&self) -> Option<&str> {
        self.result
            .interfaces
            .iter()
            .find(|i| i.name == self.if_name)
            .map(|i| i.mac.as_str())
    }
}

// `null` reads as the type's default
mod nullable {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASCAL: &str = r#"{
        "Kind": "cniCacheV1",
        "ContainerId": "abc123",
        "Config": "eyJ0eXBlIjoiYnJpZGdlIn0=",
        "IfName": "eth0",
        "NetworkName": "bridge",
        "Result": {
            "CniVersion": "1.0.0",
            "Dns": {"nameservers": ["10.4.0.1"]},
            "Interfaces": [
                {"Name": "nerdctl0", "Mac": "2a:1b:3c:4d:5e:6f"},
                {"Name": "eth0", "Mac": "aa:bb:cc:dd:ee:ff", "Sandbox": "/proc/812/ns/net"}
            ],
            "Ips": [{"Address": "10.4.0.2/24", "Gateway": "10.4.0.1", "Interface": 1}],
            "Routes": [{"Dst": "0.0.0.0/0"}]
        }
    }"#;

    const CAMEL: &str = r#"{
        "kind": "cniCacheV1",
        "containerId": "abc123",
        "ifName": "eth0",
        "networkName": "bridge",
        "result": {
            "cniVersion": "1.0.0",
            "dns": null,
            "interfaces": [
                {"name": "eth0", "mac": "aa:bb:cc:dd:ee:ff", "sandbox": "/proc/812/ns/net"}
            ],
            "ips": [{"address": "10.4.0.2/24", "gateway": "10.4.0.1", "interface": 1}],
            "routes": [{"dst": "0.0.0.0/0"}]
        }
    }"#;

    #[test]
    fn test_parse_pascal_case() {
        let entry = CniCacheEntry::parse(PASCAL.as_bytes()).unwrap();
        assert_eq!(entry.container_id, "abc123");
        assert_eq!(entry.result.cni_version, "1.0.0");
        assert_eq!(entry.result.routes[0].dst, "0.0.0.0/0");
        assert_eq!(
            entry.result.dns["nameservers"],
            serde_json::json!(["10.4.0.1"])
        );
        assert_eq!(entry.result.interfaces[1].sandbox, "/proc/812/ns/net");
    }

    #[test]
    fn test_parse_libcni_keys() {
        let entry = CniCacheEntry::parse(CAMEL.as_bytes()).unwrap();
        assert_eq!(entry.if_name, "eth0");
        assert!(entry.result.dns.is_empty());
        assert_eq!(entry.primary_ip().map(|ip| ip.interface), Some(1));
        assert_eq!(entry.primary_mac(), Some("aa:bb:cc:dd:ee:ff"));
    }

    #[test]
    fn test_missing_fields_default() {
        let entry = CniCacheEntry::parse(br#"{"IfName": "eth0"}"#).unwrap();
        assert!(entry.primary_ip().is_none());
        assert!(entry.primary_mac().is_none());
        assert!(entry.config.is_empty());
    }

    #[test]
    fn test_first_matching_interface_wins() {
        let entry = CniCacheEntry {
            if_name: "eth0".to_string(),
            result: CniResult {
                interfaces: vec![
                    CniInterface {
                        name: "eth0".to_string(),
                        mac: "02:00:00:00:00:01".to_string(),
                        ..Default::default()
                    },
                    CniInterface {
                        name: "eth0".to_string(),
                        mac: "02:00:00:00:00:02".to_string(),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(entry.primary_mac(), Some("02:00:00:00:00:01"));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(CniCacheEntry::parse(b"{\"IfName\": ").is_err());
        let wrong_type = br#"{"Result": {"Ips": [{"Interface": "two"}]}}"#;
        assert!(CniCacheEntry::parse(wrong_type).is_err());
    }
}
