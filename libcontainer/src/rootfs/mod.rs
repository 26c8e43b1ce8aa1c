//! The Filesystem Module (spec.md §4.3): establishes the container's view of
//! the filesystem inside the child, after the mount namespace is already
//! isolated. Runs entirely in the child process.

mod device;
mod mount;

use std::path::{Path, PathBuf};

pub use mount::CustomMount;

use crate::syscall::Syscall;

#[derive(Debug, thiserror::Error)]
pub enum RootfsError {
    #[error("failed to make mount namespace private")]
    PrivatePropagation(#[source] crate::error::SyscallError),
    #[error("failed to pivot root to {0:?}")]
    PivotRoot(PathBuf, #[source] crate::error::SyscallError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

type Result<T> = std::result::Result<T, RootfsError>;

/// Prepares `rootfs` as the container's new root and pivots into it. Default
/// mounts and device nodes are best-effort (warnings only); the private
/// remount and the final pivot are fatal on failure.
pub fn prepare_and_pivot(
    syscall: &dyn Syscall,
    rootfs: &Path,
    custom_mounts: &[CustomMount],
) -> Result<()> {
    mount::make_private(syscall, rootfs)?;
    mount::mount_defaults(syscall, rootfs);
    device::populate_devices(syscall, rootfs);
    mount::mount_custom(syscall, rootfs, custom_mounts);

    syscall
        .pivot_rootfs(rootfs)
        .map_err(|e| RootfsError::PivotRoot(rootfs.to_path_buf(), e))?;

    Ok(())
}
