//! nsinspect Core - Snapshot model, identifiers, and errors
//!
//! This crate provides the types shared by the live namespace inspector and
//! the CNI cache reader.

#![warn(missing_docs, clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod interface;
pub mod primary;
pub mod types;

pub use error::{Error, Result};
pub use interface::{InterfaceFlags, NetworkInterface, NetworkNamespaceSnapshot};
pub use primary::select_primary;
pub use types::{ContainerId, ProcessId};
