//! CNI result cache fallback
//!
//! When a container's network namespace cannot be entered, the result its
//! CNI plugin cached on the host still describes the primary interface.
//! This crate reads that record and rebuilds an approximate
//! [`NetworkNamespaceSnapshot`] from it.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod reader;
pub mod result;

pub use config::CniCacheConfig;
pub use reader::{CniResultReader, loopback_interface, snapshot_from_entry};
pub use result::{CniCacheEntry, CniInterface, CniIp, CniResult, CniRoute};

// Re-export commonly used types
pub use nsinspect_core::{ContainerId, NetworkNamespaceSnapshot};
