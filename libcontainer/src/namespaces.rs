//! Translates a container's logical namespace requests into the kernel
//! clone-flag bitmask the Process Module passes to `clone(2)`, and joins any
//! pre-existing namespace handles (paths) ahead of the clone call.

use std::collections::HashMap;
use std::path::PathBuf;

use nix::fcntl::{self, OFlag};
use nix::sched::CloneFlags;
use nix::sys::stat::Mode;
use nix::unistd;

use crate::syscall::Syscall;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamespaceType {
    Pid,
    Network,
    Ipc,
    Uts,
    Mount,
    User,
    Cgroup,
    /// An unrecognised namespace type string from the bundle spec. It
    /// contributes nothing to the clone bitmask (spec.md §8 "Boundary
    /// behaviors": unknown type yields the zero of the enum).
    Unknown,
}

impl NamespaceType {
    pub fn from_spec_str(s: &str) -> Self {
        match s {
            "pid" => Self::Pid,
            "network" => Self::Network,
            "ipc" => Self::Ipc,
            "uts" => Self::Uts,
            "mount" => Self::Mount,
            "user" => Self::User,
            "cgroup" => Self::Cgroup,
            _ => Self::Unknown,
        }
    }

    fn clone_flag(self) -> CloneFlags {
        match self {
            Self::Pid => CloneFlags::CLONE_NEWPID,
            Self::Network => CloneFlags::CLONE_NEWNET,
            Self::Ipc => CloneFlags::CLONE_NEWIPC,
            Self::Uts => CloneFlags::CLONE_NEWUTS,
            Self::Mount => CloneFlags::CLONE_NEWNS,
            Self::User => CloneFlags::CLONE_NEWUSER,
            Self::Cgroup => CloneFlags::CLONE_NEWCGROUP,
            Self::Unknown => CloneFlags::empty(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NamespaceRequest {
    pub typ: NamespaceType,
    /// Path to an existing namespace handle (e.g. `/proc/<pid>/ns/net`) to
    /// join instead of creating a fresh namespace.
    pub path: Option<PathBuf>,
    pub enable: bool,
}

impl NamespaceRequest {
    pub fn new(typ: NamespaceType, path: Option<PathBuf>) -> Self {
        Self {
            typ,
            path,
            enable: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NamespaceError {
    #[error("failed to open namespace handle {0:?}")]
    Open(PathBuf, #[source] nix::Error),
    #[error("failed to join namespace {0:?} via {1:?}")]
    SetNs(NamespaceType, PathBuf, #[source] crate::error::SyscallError),
    #[error("failed to unshare namespace {0:?}")]
    Unshare(NamespaceType, #[source] crate::error::SyscallError),
}

pub struct Namespaces {
    syscall: Box<dyn Syscall>,
    by_type: HashMap<NamespaceType, NamespaceRequest>,
}

impl Namespaces {
    pub fn new(syscall: Box<dyn Syscall>, requests: Vec<NamespaceRequest>) -> Self {
        let by_type = requests.into_iter().map(|r| (r.typ, r)).collect();
        Self { syscall, by_type }
    }

    /// The bitmask to OR into the `clone(2)` flags: the flag of every
    /// enabled request that does *not* specify a path to join. Requests with
    /// a path are joined directly instead (spec.md §4.2, testable property
    /// #5).
    pub fn clone_flags(&self) -> CloneFlags {
        self.by_type
            .values()
            .filter(|r| r.enable && r.path.is_none())
            .fold(CloneFlags::empty(), |acc, r| acc | r.typ.clone_flag())
    }

    /// Joins every enabled, path-specifying namespace in the current thread.
    /// Must run before the clone call (testable property #6).
    pub fn join_paths(&self) -> Result<(), NamespaceError> {
        for req in self.by_type.values() {
            if !req.enable {
                continue;
            }
            let Some(path) = &req.path else { continue };
            let fd = fcntl::open(path.as_path(), OFlag::empty(), Mode::empty())
                .map_err(|e| NamespaceError::Open(path.clone(), e))?;
            self.syscall
                .set_ns(fd, req.typ.clone_flag())
                .map_err(|e| NamespaceError::SetNs(req.typ, path.clone(), e))?;
            let _ = unistd::close(fd);
        }
        Ok(())
    }

    pub fn get(&self, typ: NamespaceType) -> Option<&NamespaceRequest> {
        self.by_type.get(&typ)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syscall::test::TestHelperSyscall;

    fn ns(typ: NamespaceType, path: Option<&str>) -> NamespaceRequest {
        NamespaceRequest::new(typ, path.map(PathBuf::from))
    }

    #[test]
    fn clone_flags_equal_or_of_pathless_enabled_entries() {
        let requests = vec![
            ns(NamespaceType::Pid, None),
            ns(NamespaceType::Uts, None),
            ns(NamespaceType::Network, Some("/proc/1/ns/net")),
        ];
        let namespaces = Namespaces::new(Box::new(TestHelperSyscall::default()), requests);
        assert_eq!(
            namespaces.clone_flags(),
            CloneFlags::CLONE_NEWPID | CloneFlags::CLONE_NEWUTS
        );
    }

    #[test]
    fn clone_flags_zero_when_all_entries_have_paths() {
        let requests = vec![
            ns(NamespaceType::Pid, Some("/proc/1/ns/pid")),
            ns(NamespaceType::Uts, Some("/proc/1/ns/uts")),
        ];
        let namespaces = Namespaces::new(Box::new(TestHelperSyscall::default()), requests);
        assert_eq!(namespaces.clone_flags(), CloneFlags::empty());
    }

    #[test]
    fn unknown_namespace_type_contributes_nothing() {
        let requests = vec![ns(NamespaceType::Unknown, None)];
        let namespaces = Namespaces::new(Box::new(TestHelperSyscall::default()), requests);
        assert_eq!(namespaces.clone_flags(), CloneFlags::empty());
    }
}
