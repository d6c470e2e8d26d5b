//! Live network namespace inspection
//!
//! This crate enters the network namespace of a running process and lists
//! its interfaces:
//! - [`NetnsGuard`] - Scoped `setns(2)` that restores the thread on drop
//! - [`InterfaceSource`] - Interface enumeration backends
//! - [`NetnsInspector`] - Builds a [`NetworkNamespaceSnapshot`] for a PID

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod config;
pub mod guard;
pub mod inspector;
pub mod source;

pub use config::NetnsConfig;
pub use guard::{NetnsGuard, with_netns_path};
pub use inspector::{NetnsInspector, collect_interfaces, format_hardware_addr};
pub use source::{IfAddrsSource, InterfaceSource, Link, MockSource};

// Re-export commonly used types
pub use nsinspect_core::{NetworkInterface, NetworkNamespaceSnapshot, ProcessId};
