//! Interface and snapshot value objects shared by both inspection paths

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::primary::select_primary;

/// Interface flag set
///
/// Bits are independent of the kernel's `IFF_*` values; only the flags
/// that are reported are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<&'static str>", try_from = "Vec<String>")]
pub struct InterfaceFlags(u32);

impl InterfaceFlags {
    /// Interface is administratively up
    pub const UP: Self = Self(0b0000_0001);
    /// Interface supports broadcast
    pub const BROADCAST: Self = Self(0b0000_0010);
    /// Interface is a loopback interface
    pub const LOOPBACK: Self = Self(0b0000_0100);
    /// Interface is a point-to-point link
    pub const POINT_TO_POINT: Self = Self(0b0000_1000);
    /// Interface supports multicast
    pub const MULTICAST: Self = Self(0b0001_0000);
    /// Interface is operationally running
    pub const RUNNING: Self = Self(0b0010_0000);

    /// No flags
    pub const NONE: Self = Self(0);

    const NAMES: [(Self, &'static str); 6] = [
        (Self::UP, "up"),
        (Self::BROADCAST, "broadcast"),
        (Self::LOOPBACK, "loopback"),
        (Self::POINT_TO_POINT, "pointtopoint"),
        (Self::MULTICAST, "multicast"),
        (Self::RUNNING, "running"),
    ];

    /// Check if flag is set
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Check if no flag is set
    #[must_use]
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Human readable names of the set flags, in canonical order
    ///
    /// The zero value has no names.
    #[must_use]
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Look up a single flag by name
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(_, n)| *n == name)
            .map(|(flag, _)| *flag)
    }
}

impl std::ops::BitOr for InterfaceFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitAnd for InterfaceFlags {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl From<nix::net::if_::InterfaceFlags> for InterfaceFlags {
    fn from(raw: nix::net::if_::InterfaceFlags) -> Self {
        use nix::net::if_::InterfaceFlags as Iff;

        let mapping = [
            (Iff::IFF_UP, Self::UP),
            (Iff::IFF_BROADCAST, Self::BROADCAST),
            (Iff::IFF_LOOPBACK, Self::LOOPBACK),
            (Iff::IFF_POINTOPOINT, Self::POINT_TO_POINT),
            (Iff::IFF_MULTICAST, Self::MULTICAST),
            (Iff::IFF_RUNNING, Self::RUNNING),
        ];

        mapping
            .into_iter()
            .filter(|(iff, _)| raw.contains(*iff))
            .fold(Self::NONE, |acc, (_, flag)| acc | flag)
    }
}

impl From<InterfaceFlags> for Vec<&'static str> {
    fn from(flags: InterfaceFlags) -> Self {
        flags.names()
    }
}

impl TryFrom<Vec<String>> for InterfaceFlags {
    type Error = String;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        names.iter().try_fold(Self::NONE, |acc, name| {
            Self::from_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| format!("unknown interface flag: {name}"))
        })
    }
}

impl fmt::Display for InterfaceFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "0");
        }
        write!(f, "{}", self.names().join("|"))
    }
}

/// Observable state of one network interface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NetworkInterface {
    /// Platform interface index
    #[serde(rename = "Index")]
    pub index: u32,

    /// Maximum transfer unit
    #[serde(rename = "MTU")]
    pub mtu: u32,

    /// Interface name
    #[serde(rename = "Name")]
    pub name: String,

    /// Hardware address, empty when the interface has none
    #[serde(
        rename = "HardwareAddr",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub hardware_addr: String,

    /// Interface flags
    #[serde(
        rename = "Flags",
        default,
        skip_serializing_if = "InterfaceFlags::is_empty"
    )]
    pub flags: InterfaceFlags,

    /// Bound addresses in CIDR notation
    #[serde(rename = "Addrs", default, skip_serializing_if = "Vec::is_empty")]
    pub addrs: Vec<String>,
}

impl NetworkInterface {
    /// Whether this interface qualifies as a primary interface
    #[must_use]
    pub fn is_primary_candidate(&self) -> bool {
        !self.flags.contains(InterfaceFlags::LOOPBACK)
            && self.flags.contains(InterfaceFlags::UP)
            && !self.name.starts_with("lo")
    }
}

impl fmt::Display for NetworkInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: {}: <{}> mtu {}",
            self.index, self.name, self.flags, self.mtu
        )?;
        if !self.hardware_addr.is_empty() {
            writeln!(f, "    link/ether {}", self.hardware_addr)?;
        }
        for addr in &self.addrs {
            let family = if addr.contains(':') { "inet6" } else { "inet" };
            writeln!(f, "    {family} {addr}")?;
        }
        Ok(())
    }
}

/// Network configuration of one namespace at the time it was inspected
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkNamespaceSnapshot {
    /// Interfaces in platform index order
    #[serde(default)]
    pub interfaces: Vec<NetworkInterface>,

    /// Platform index of the primary interface, 0 when none was found
    #[serde(default)]
    pub primary_interface: u32,
}

impl NetworkNamespaceSnapshot {
    /// Build a snapshot, electing the primary interface from the list
    #[must_use]
    pub fn from_interfaces(interfaces: Vec<NetworkInterface>) -> Self {
        let primary_interface = select_primary(&interfaces);
        Self {
            interfaces,
            primary_interface,
        }
    }

    /// The primary interface, if one was identified and is present
    #[must_use]
    pub fn primary(&self) -> Option<&NetworkInterface> {
        if self.primary_interface == 0 {
            return None;
        }
        self.interfaces
            .iter()
            .find(|i| i.index == self.primary_interface)
    }

    /// Check if the snapshot holds no interfaces
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.interfaces.is_empty()
    }
}

impl fmt::Display for NetworkNamespaceSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for interface in &self.interfaces {
            write!(f, "{interface}")?;
        }
        match self.primary() {
            Some(primary) => writeln!(
                f,
                "Primary interface: {} (index {})",
                primary.name, primary.index
            ),
            None if self.primary_interface != 0 => {
                writeln!(f, "Primary interface: index {}", self.primary_interface)
            }
            None => writeln!(f, "Primary interface: none"),
        }
    }
}
