//! Live inspection of a process's network namespace

use nsinspect_core::{Error, NetworkInterface, NetworkNamespaceSnapshot, ProcessId, Result};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::config::NetnsConfig;
use crate::guard::with_netns_path;
use crate::source::{IfAddrsSource, InterfaceSource, Link};

/// Inspects network namespaces by entering them
#[derive(Debug, Clone, Default)]
pub struct NetnsInspector {
    config: NetnsConfig,
}

impl NetnsInspector {
    /// Create a new inspector
    #[must_use]
    pub const fn new(config: NetnsConfig) -> Self {
        Self { config }
    }

    /// Create a new inspector with default config
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(NetnsConfig::default())
    }

    /// Inspect the network namespace of a running process
    ///
    /// # Errors
    /// Returns error if the PID is invalid, the namespace cannot be entered,
    /// or the interface list cannot be read
    pub fn inspect(&self, pid: ProcessId) -> Result<NetworkNamespaceSnapshot> {
        let pid = pid.validated()?;
        let path = self.config.namespace_path(pid);

        info!(pid = %pid, path = %path.display(), "Inspecting network namespace");

        self.inspect_path(&path)
    }

    /// Inspect the network namespace behind an explicit handle path
    ///
    /// # Errors
    /// Returns error if the namespace cannot be entered or the interface list
    /// cannot be read
    pub fn inspect_path(&self, path: &Path) -> Result<NetworkNamespaceSnapshot> {
        let interfaces = with_netns_path(path, || {
            IfAddrsSource::capture()
                .and_then(|source| collect_interfaces(&source))
                .map_err(|e| Error::Namespace {
                    message: format!("Failed to list interfaces in {}: {e}", path.display()),
                })
        })?;

        let snapshot = NetworkNamespaceSnapshot::from_interfaces(interfaces);

        debug!(
            path = %path.display(),
            interfaces = snapshot.interfaces.len(),
            primary = snapshot.primary_interface,
            "Namespace inspected"
        );

        Ok(snapshot)
    }
}

/// Build interface records from a source
///
/// A failed address lookup leaves that interface without addresses instead
/// of failing the whole listing.
///
/// # Errors
/// Returns error only if the source cannot list links
pub fn collect_interfaces<S>(source: &S) -> Result<Vec<NetworkInterface>>
where
    S: InterfaceSource + ?Sized,
{
    let links = source.links()?;

    Ok(links
        .into_iter()
        .map(|link| {
            let addrs = source.addresses(&link).unwrap_or_else(|e| {
                warn!(interface = %link.name, error = %e, "Failed to list addresses");
                Vec::new()
            });
            to_interface(link, addrs)
        })
        .collect())
}

fn to_interface(link: Link, addrs: Vec<String>) -> NetworkInterface {
    NetworkInterface {
        index: link.index,
        mtu: link.mtu,
        hardware_addr: link
            .hardware_addr
            .as_deref()
            .map(format_hardware_addr)
            .unwrap_or_default(),
        flags: link.flags.into(),
        name: link.name,
        addrs,
    }
}

/// Colon separated lowercase hex; all-zero addresses count as absent
#[must_use]
pub fn format_hardware_addr(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| *b == 0) {
        return String::new();
    }
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;
    use nix::net::if_::InterfaceFlags as Iff;
    use nsinspect_core::InterfaceFlags;

    fn sample_source() -> MockSource {
        MockSource::new()
            .with_link(
                Link::new(1, "lo", Iff::IFF_UP | Iff::IFF_LOOPBACK | Iff::IFF_RUNNING)
                    .with_mtu(65536)
                    .with_hardware_addr(vec![0; 6]),
                &["127.0.0.1/8", "::1/128"],
            )
            .with_link(
                Link::new(
                    7,
                    "eth0",
                    Iff::IFF_UP | Iff::IFF_BROADCAST | Iff::IFF_MULTICAST | Iff::IFF_RUNNING,
                )
                .with_mtu(1500)
                .with_hardware_addr(vec![0x0a, 0x58, 0x0a, 0xf4, 0x00, 0x07]),
                &["10.244.0.7/24", "fe80::858:aff:fef4:7/64"],
            )
    }

    #[test]
    fn test_hardware_addr_format() {
        assert_eq!(
            format_hardware_addr(&[0xaa, 0xbb, 0xcc, 0x0d, 0xee, 0xff]),
            "aa:bb:cc:0d:ee:ff"
        );
        assert_eq!(format_hardware_addr(&[0; 6]), "");
        assert_eq!(format_hardware_addr(&[]), "");
    }

    #[test]
    fn test_collect_maps_every_field() {
        let interfaces = collect_interfaces(&sample_source()).unwrap();
        assert_eq!(interfaces.len(), 2);

        let lo = &interfaces[0];
        assert_eq!(lo.name, "lo");
        assert_eq!(lo.mtu, 65536);
        assert!(lo.hardware_addr.is_empty());
        assert_eq!(lo.flags.names(), vec!["up", "loopback", "running"]);

        let eth0 = &interfaces[1];
        assert_eq!(eth0.index, 7);
        assert_eq!(eth0.hardware_addr, "0a:58:0a:f4:00:07");
        assert!(eth0.flags.contains(InterfaceFlags::MULTICAST));
        assert_eq!(eth0.addrs.len(), 2);
        assert_eq!(eth0.addrs[1], "fe80::858:aff:fef4:7/64");
    }

    #[test]
    fn test_zero_flags_decode_to_nothing() {
        let link = Link::new(4, "dummy0", Iff::empty());
        let source = MockSource::new().with_link(link, &[]);
        let interfaces = collect_interfaces(&source).unwrap();
        assert!(interfaces[0].flags.is_empty());
        assert!(interfaces[0].flags.names().is_empty());
    }

    #[test]
    fn test_address_failure_keeps_other_interfaces() {
        let unreadable = Link::new(9, "eth1", Iff::IFF_UP);
        let source = sample_source().with_unreadable_link(unreadable);

        let interfaces = collect_interfaces(&source).unwrap();
        assert_eq!(interfaces.len(), 3);
        assert_eq!(interfaces[1].addrs.len(), 2);
        assert_eq!(interfaces[2].name, "eth1");
        assert!(interfaces[2].addrs.is_empty());
    }

    #[test]
    fn test_link_failure_is_fatal() {
        assert!(collect_interfaces(&MockSource::new().failing()).is_err());
    }

    #[test]
    fn test_snapshot_from_collected() {
        let interfaces = collect_interfaces(&sample_source()).unwrap();
        let snapshot = NetworkNamespaceSnapshot::from_interfaces(interfaces);
        assert_eq!(snapshot.primary_interface, 7);
    }

    #[test]
    fn test_inspect_rejects_invalid_pid() {
        let inspector = NetnsInspector::with_defaults();
        assert!(matches!(
            inspector.inspect(ProcessId::from_raw(0)),
            Err(Error::InvalidConfig { .. })
        ));
    }
}
