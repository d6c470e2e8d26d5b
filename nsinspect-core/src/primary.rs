//! Primary interface election

use crate::NetworkInterface;

/// Return the platform index of the first interface that is up, not a
/// loopback, and not named with the `lo` prefix
///
/// Returns 0 when no interface qualifies. Input order decides ties.
#[must_use]
pub fn select_primary(interfaces: &[NetworkInterface]) -> u32 {
    interfaces
        .iter()
        .find(|i| i.is_primary_candidate())
        .map_or(0, |i| i.index)
}
