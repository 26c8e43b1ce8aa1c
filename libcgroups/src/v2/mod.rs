//! The cgroup v2 Manager: one subtree per container under a fixed parent
//! directory named after the runtime (spec.md §4.4).

use std::fs;
use std::path::PathBuf;

use nix::unistd::Pid;

use crate::common::{mkdir_idempotent, write_cgroup_file, CGROUP_ROOT};
use crate::v2_available;
use crate::Limits;

const RUNTIME_PARENT: &str = "nanok";
const CONTROLLERS: &[&str] = &["cpu", "memory", "pids", "io", "cpuset"];

#[derive(Debug, thiserror::Error)]
pub enum CgroupError {
    #[error("failed to attach pid {0} to cgroup")]
    Attach(Pid, #[source] crate::common::CgroupFileError),
}

pub struct Manager {
    subtree: PathBuf,
}

impl Manager {
    pub fn new(id: &str) -> Self {
        Self {
            subtree: PathBuf::from(CGROUP_ROOT).join(RUNTIME_PARENT).join(id),
        }
    }

    fn parent(&self) -> PathBuf {
        PathBuf::from(CGROUP_ROOT).join(RUNTIME_PARENT)
    }

    /// Creates the per-container subtree, enables the standard controllers,
    /// and applies any non-zero resource limits. A missing v2 hierarchy
    /// makes this whole operation a no-op with a warning.
    pub fn setup(&self, limits: &Limits) {
        if !v2_available() {
            log::warn!("cgroup v2 hierarchy not mounted, skipping cgroup setup");
            return;
        }

        let parent = self.parent();
        if let Err(err) = mkdir_idempotent(&parent) {
            log::warn!("failed to create cgroup parent {parent:?}: {err}");
            return;
        }
        if let Err(err) = mkdir_idempotent(&self.subtree) {
            log::warn!("failed to create cgroup subtree {:?}: {err}", self.subtree);
            return;
        }

        for controller in CONTROLLERS {
            let entry = format!("+{controller}");
            if let Err(err) = write_cgroup_file(parent.join("cgroup.subtree_control"), entry) {
                log::warn!("failed to enable controller {controller}: {err}");
            }
        }

        if let Some(max) = limits.memory_max {
            if max != 0 {
                if let Err(err) = write_cgroup_file(self.subtree.join("memory.max"), max) {
                    log::warn!("failed to apply memory.max={max}: {err}");
                }
            }
        }
        if let Some(weight) = limits.cpu_weight {
            if weight != 0 {
                if let Err(err) = write_cgroup_file(self.subtree.join("cpu.weight"), weight) {
                    log::warn!("failed to apply cpu.weight={weight}: {err}");
                }
            }
        }
        if let Some(max) = limits.pids_max {
            if max != 0 {
                if let Err(err) = write_cgroup_file(self.subtree.join("pids.max"), max) {
                    log::warn!("failed to apply pids.max={max}: {err}");
                }
            }
        }
    }

    /// Adds `pid` to the subtree's `cgroup.procs`. Fatal on failure (spec.md
    /// §4.4: "A write failure is fatal").
    pub fn attach(&self, pid: Pid) -> Result<(), CgroupError> {
        write_cgroup_file(self.subtree.join("cgroup.procs"), pid.as_raw())
            .map_err(|e| CgroupError::Attach(pid, e))
    }

    /// Moves processes back to the root cgroup and removes the subtree.
    /// Best-effort: a missing subtree is not an error.
    pub fn cleanup(&self) {
        if !self.subtree.exists() {
            return;
        }

        let _ = write_cgroup_file(self.subtree.join("cgroup.procs"), 0);
        if let Err(err) = fs::remove_dir(&self.subtree) {
            log::warn!("failed to remove cgroup subtree {:?}: {err}", self.subtree);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtree_path_is_id_under_fixed_parent() {
        let m = Manager::new("c1");
        assert_eq!(
            m.subtree,
            PathBuf::from(CGROUP_ROOT).join("nanok").join("c1")
        );
    }
}
