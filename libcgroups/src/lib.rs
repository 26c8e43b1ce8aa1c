//! cgroup v2 resource control for the Cgroup Module (spec.md §4.4).
//!
//! Only cgroup v2 is supported: this runtime carries no v1 or systemd
//! driver. If the v2 hierarchy isn't mounted, every operation here becomes
//! a no-op with a warning rather than an error, matching the "cgroup setup
//! is a no-op" Non-goal.

mod common;
mod v2;

pub use common::{Limits, CGROUP_ROOT};
pub use v2::{CgroupError, Manager};

use std::path::Path;

/// `true` iff the unified cgroup v2 hierarchy is mounted at the fixed path.
pub fn v2_available() -> bool {
    Path::new(CGROUP_ROOT).join("cgroup.controllers").exists()
}
