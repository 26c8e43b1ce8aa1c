//! A thin trait over the handful of raw Linux syscalls the Namespace,
//! Filesystem, Cgroup and Process modules drive directly. Indirecting
//! through a trait (rather than calling `nix`/`libc` inline) is what lets
//! `rootfs`/`namespaces` unit tests run without root: tests substitute
//! `test::TestHelperSyscall`, which records calls instead of making them.

pub mod linux;
pub mod test;

use std::any::Any;
use std::path::Path;

use nix::mount::MsFlags;
use nix::sched::CloneFlags;
use nix::sys::stat::{Mode, SFlag};
use nix::unistd::Pid;

use crate::error::SyscallError;

type Result<T> = std::result::Result<T, SyscallError>;

pub trait Syscall {
    fn as_any(&self) -> &dyn Any;

    fn pivot_rootfs(&self, path: &Path) -> Result<()>;
    fn chroot(&self, path: &Path) -> Result<()>;
    fn mount(
        &self,
        source: Option<&Path>,
        target: &Path,
        fstype: Option<&str>,
        flags: MsFlags,
        data: Option<&str>,
    ) -> Result<()>;
    fn umount2(&self, target: &Path) -> Result<()>;
    fn mknod(&self, path: &Path, kind: SFlag, mode: Mode, dev: u64) -> Result<()>;
    fn symlink(&self, original: &Path, link: &Path) -> Result<()>;
    fn unshare(&self, flags: CloneFlags) -> Result<()>;
    fn set_ns(&self, fd: i32, nstype: CloneFlags) -> Result<()>;
    fn set_hostname(&self, hostname: &str) -> Result<()>;
    fn chdir(&self, path: &Path) -> Result<()>;
    fn kill(&self, pid: Pid, signal: nix::sys::signal::Signal) -> Result<()>;
}

pub fn create_syscall() -> Box<dyn Syscall> {
    Box::new(linux::LinuxSyscall)
}
