//! Interface enumeration backends
//!
//! This module uses `unsafe` for the `SIOCGIFMTU` ioctl, which nix does not
//! wrap.

#![allow(unsafe_code)]

use nix::ifaddrs::{InterfaceAddress, getifaddrs};
use nix::net::if_::{InterfaceFlags, if_nametoindex};
use nix::sys::socket::{AddressFamily, SockFlag, SockType, SockaddrLike, SockaddrStorage, socket};
use nsinspect_core::{Error, Result};
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::os::fd::{AsRawFd, OwnedFd};
use tracing::{trace, warn};

/// Link-level facts about one interface, before addresses are attached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// Platform interface index
    pub index: u32,
    /// Interface name
    pub name: String,
    /// Maximum transfer unit, 0 if unknown
    pub mtu: u32,
    /// Raw hardware address bytes, if the link has one
    pub hardware_addr: Option<Vec<u8>>,
    /// Raw kernel flags
    pub flags: InterfaceFlags,
}

impl Link {
    /// Create a link with no MTU or hardware address
    #[must_use]
    pub fn new(index: u32, name: impl Into<String>, flags: InterfaceFlags) -> Self {
        Self {
            index,
            name: name.into(),
            mtu: 0,
            hardware_addr: None,
            flags,
        }
    }

    /// Set the MTU
    #[must_use]
    pub const fn with_mtu(mut self, mtu: u32) -> Self {
        self.mtu = mtu;
        self
    }

    /// Set the hardware address
    #[must_use]
    pub fn with_hardware_addr(mut self, addr: impl Into<Vec<u8>>) -> Self {
        self.hardware_addr = Some(addr.into());
        self
    }
}

/// Source of the interfaces of one network namespace
pub trait InterfaceSource {
    /// List every interface, ordered by index
    ///
    /// # Errors
    /// Returns error if the interface list cannot be read at all
    fn links(&self) -> Result<Vec<Link>>;

    /// List the addresses bound to one interface as CIDR strings
    ///
    /// # Errors
    /// Returns error if the addresses of this interface cannot be read
    fn addresses(&self, link: &Link) -> Result<Vec<String>>;
}

/// Production source backed by one `getifaddrs(3)` dump
///
/// Links and addresses are both read from the dump taken by
/// [`IfAddrsSource::capture`], so they describe the same moment.
#[derive(Debug, Clone, Default)]
pub struct IfAddrsSource {
    entries: Vec<InterfaceAddress>,
}

impl IfAddrsSource {
    /// Dump the interfaces of the namespace the calling thread is in
    ///
    /// # Errors
    /// Returns error if `getifaddrs(3)` fails
    pub fn capture() -> Result<Self> {
        Ok(Self::from_entries(getifaddrs()?.collect()))
    }

    /// Use entries that were already dumped
    #[must_use]
    pub const fn from_entries(entries: Vec<InterfaceAddress>) -> Self {
        Self { entries }
    }
}

impl InterfaceSource for IfAddrsSource {
    fn links(&self) -> Result<Vec<Link>> {
        let mut links = group_links(&self.entries);

        let sock = mtu_socket();
        if let Err(e) = &sock {
            warn!(error = %e, "Cannot open socket for MTU lookups");
        }

        links.retain_mut(|link| {
            if link.index == 0 {
                match if_nametoindex(link.name.as_str()) {
                    Ok(index) => link.index = index,
                    Err(e) => {
                        warn!(interface = %link.name, error = %e, "Interface vanished");
                        return false;
                    }
                }
            }

            if let Ok(sock) = &sock {
                match query_mtu(sock, &link.name) {
                    Ok(mtu) => link.mtu = mtu,
                    Err(e) => warn!(interface = %link.name, error = %e, "Failed to read MTU"),
                }
            }

            trace!(index = link.index, interface = %link.name, mtu = link.mtu, "Found link");
            true
        });

        links.sort_by_key(|l| l.index);
        Ok(links)
    }

    fn addresses(&self, link: &Link) -> Result<Vec<String>> {
        Ok(addresses_of(&self.entries, &link.name))
    }
}

/// Fold dump entries into one link per interface, in dump order
///
/// Index and hardware address come from the `AF_PACKET` entry of each
/// interface. Links without one keep index 0.
fn group_links(entries: &[InterfaceAddress]) -> Vec<Link> {
    let mut links: Vec<Link> = Vec::new();

    for ifaddr in entries {
        // IPv4 alias labels ("eth0:1") belong to their parent link
        if ifaddr.interface_name.contains(':') {
            continue;
        }

        let position = links
            .iter()
            .position(|l| l.name == ifaddr.interface_name)
            .unwrap_or_else(|| {
                links.push(Link::new(0, ifaddr.interface_name.clone(), ifaddr.flags));
                links.len() - 1
            });

        let link_addr = ifaddr
            .address
            .as_ref()
            .and_then(SockaddrStorage::as_link_addr);
        if let Some(link_addr) = link_addr {
            let link = &mut links[position];
            link.index = u32::try_from(link_addr.ifindex()).unwrap_or(0);
            if let Some(bytes) = link_addr.addr() {
                let len = link_addr.halen().min(bytes.len());
                link.hardware_addr = Some(bytes[..len].to_vec());
            }
        }
    }

    links
}

fn addresses_of(entries: &[InterfaceAddress], name: &str) -> Vec<String> {
    entries
        .iter()
        .filter(|ifaddr| belongs_to(&ifaddr.interface_name, name))
        .filter_map(render_cidr)
        .collect()
}

fn belongs_to(label: &str, name: &str) -> bool {
    label
        .strip_prefix(name)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(':'))
}

fn socket_ip(addr: &SockaddrStorage) -> Option<IpAddr> {
    match addr.family() {
        Some(AddressFamily::Inet) => addr.as_sockaddr_in().map(|sin| IpAddr::V4(sin.ip())),
        Some(AddressFamily::Inet6) => addr.as_sockaddr_in6().map(|sin6| IpAddr::V6(sin6.ip())),
        _ => None,
    }
}

/// Render an IP entry as `<ip>/<prefix>`; non-IP entries yield `None`
fn render_cidr(ifaddr: &InterfaceAddress) -> Option<String> {
    let ip = socket_ip(ifaddr.address.as_ref()?)?;

    let prefix = match ifaddr.netmask.as_ref().and_then(socket_ip) {
        Some(IpAddr::V4(mask)) => u32::from(mask).count_ones(),
        Some(IpAddr::V6(mask)) => u128::from(mask).count_ones(),
        None if ip.is_ipv4() => 32,
        None => 128,
    };

    Some(format!("{ip}/{prefix}"))
}

fn mtu_socket() -> nix::Result<OwnedFd> {
    socket(
        AddressFamily::Inet,
        SockType::Datagram,
        SockFlag::SOCK_CLOEXEC,
        None,
    )
}

#[allow(clippy::cast_possible_wrap)]
fn query_mtu(sock: &OwnedFd, name: &str) -> Result<u32> {
    let bytes = name.as_bytes();
    if bytes.len() >= libc::IFNAMSIZ {
        return Err(Error::Namespace {
            message: format!("Interface name too long: {name}"),
        });
    }

    let mut req: libc::ifreq = unsafe { std::mem::zeroed() };
    for (dst, src) in req.ifr_name.iter_mut().zip(bytes) {
        *dst = *src as libc::c_char;
    }

    if unsafe { libc::ioctl(sock.as_raw_fd(), libc::SIOCGIFMTU as _, &mut req) } < 0 {
        return Err(std::io::Error::last_os_error().into());
    }

    let mtu = unsafe { req.ifr_ifru.ifru_mtu };
    Ok(u32::try_from(mtu).unwrap_or(0))
}

/// In-memory source for tests (doesn't touch the kernel)
///
/// # Example
/// ```
/// use nix::net::if_::InterfaceFlags;
/// use nsinspect_namespace::{InterfaceSource, Link, MockSource};
///
/// let source = MockSource::new()
///     .with_link(Link::new(2, "eth0", InterfaceFlags::IFF_UP), &["10.0.0.2/24"]);
///
/// let links = source.links().unwrap();
/// assert_eq!(links.len(), 1);
/// assert_eq!(source.addresses(&links[0]).unwrap(), vec!["10.0.0.2/24"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    links: Vec<Link>,
    addresses: HashMap<String, Vec<String>>,
    failing_addresses: HashSet<String>,
    fail_links: bool,
}

impl MockSource {
    /// Create an empty mock source
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link with its addresses
    #[must_use]
    pub fn with_link(mut self, link: Link, addrs: &[&str]) -> Self {
        self.addresses.insert(
            link.name.clone(),
            addrs.iter().map(ToString::to_string).collect(),
        );
        self.links.push(link);
        self
    }

    /// Add a link whose address lookup fails
    #[must_use]
    pub fn with_unreadable_link(mut self, link: Link) -> Self {
        self.failing_addresses.insert(link.name.clone());
        self.links.push(link);
        self
    }

    /// Make the link listing itself fail
    #[must_use]
    pub const fn failing(mut self) -> Self {
        self.fail_links = true;
        self
    }
}

impl InterfaceSource for MockSource {
    fn links(&self) -> Result<Vec<Link>> {
        if self.fail_links {
            return Err(Error::System(nix::Error::EACCES));
        }
        Ok(self.links.clone())
    }

    fn addresses(&self, link: &Link) -> Result<Vec<String>> {
        if self.failing_addresses.contains(&link.name) {
            return Err(Error::System(nix::Error::ENODEV));
        }
        Ok(self.addresses.get(&link.name).cloned().unwrap_or_default())
    }
}
