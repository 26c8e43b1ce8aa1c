//! Real syscall implementations, via `nix`.

use std::any::Any;
use std::path::Path;

use nix::mount::{mount, umount2, MntFlags, MsFlags};
use nix::sched::{setns, unshare, CloneFlags};
use nix::sys::signal::{kill, Signal};
use nix::sys::stat::{mknod, Mode, SFlag};
use nix::unistd::{chdir, pivot_root, sethostname, symlinkat, Pid};

use super::Syscall;
use crate::error::SyscallError;

type Result<T> = std::result::Result<T, SyscallError>;

#[derive(Clone)]
pub struct LinuxSyscall;

impl Syscall for LinuxSyscall {
    fn as_any(&self) -> &dyn Any {
        self
    }

    /// Atomically replaces the root mount of the calling mount namespace.
    /// Per spec.md §4.3 step 5: stage the new root under `.pivot_old`, pivot,
    /// detach-unmount the old root, and remove the staging directory.
    fn pivot_rootfs(&self, path: &Path) -> Result<()> {
        let old_root = path.join(".pivot_old");
        std::fs::create_dir_all(&old_root)?;

        pivot_root(path, &old_root)?;
        chdir("/")?;

        umount2("/.pivot_old", MntFlags::MNT_DETACH)?;
        let _ = std::fs::remove_dir("/.pivot_old");
        Ok(())
    }

    fn chroot(&self, path: &Path) -> Result<()> {
        nix::unistd::chroot(path)?;
        chdir("/")?;
        Ok(())
    }

    fn mount(
        &self,
        source: Option<&Path>,
        target: &Path,
        fstype: Option<&str>,
        flags: MsFlags,
        data: Option<&str>,
    ) -> Result<()> {
        mount(source, target, fstype, flags, data)?;
        Ok(())
    }

    fn umount2(&self, target: &Path) -> Result<()> {
        umount2(target, MntFlags::MNT_DETACH)?;
        Ok(())
    }

    fn mknod(&self, path: &Path, kind: SFlag, mode: Mode, dev: u64) -> Result<()> {
        mknod(path, kind, mode, dev)?;
        Ok(())
    }

    fn symlink(&self, original: &Path, link: &Path) -> Result<()> {
        symlinkat(original, None, link)?;
        Ok(())
    }

    fn unshare(&self, flags: CloneFlags) -> Result<()> {
        unshare(flags)?;
        Ok(())
    }

    fn set_ns(&self, fd: i32, nstype: CloneFlags) -> Result<()> {
        setns(fd, nstype)?;
        Ok(())
    }

    fn set_hostname(&self, hostname: &str) -> Result<()> {
        sethostname(hostname)?;
        Ok(())
    }

    fn chdir(&self, path: &Path) -> Result<()> {
        chdir(path)?;
        Ok(())
    }

    fn kill(&self, pid: Pid, signal: Signal) -> Result<()> {
        kill(pid, signal)?;
        Ok(())
    }
}
