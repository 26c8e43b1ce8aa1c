//! Drops all Linux capabilities from the container init process before exec.
//!
//! This is best-effort by design (spec.md §4.5 step 3e, §9): an environment
//! without the `caps` library's underlying syscalls available should warn
//! rather than silently proceed as if privileges had been dropped.

use caps::{CapSet, Capability, CapsHashSet};

pub fn drop_all() {
    for set in [
        CapSet::Effective,
        CapSet::Permitted,
        CapSet::Inheritable,
        CapSet::Ambient,
    ] {
        if let Err(err) = caps::clear(None, set) {
            log::warn!("failed to clear {set:?} capabilities, continuing without cap drop: {err}");
        }
    }

    if let Err(err) = caps::set(None, CapSet::Bounding, &CapsHashSet::new()) {
        log::warn!("failed to clear bounding capability set: {err}");
    }
}

/// Used by tests that want to assert a specific capability is absent from
/// the current process's permitted set without requiring root.
pub fn has(cap: Capability) -> bool {
    caps::read(None, CapSet::Permitted)
        .map(|set| set.contains(&cap))
        .unwrap_or(false)
}
