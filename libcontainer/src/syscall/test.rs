//! A recording `Syscall` implementation used by unit tests so that
//! namespace/rootfs/process logic can be exercised without root privileges
//! or a real mount namespace.

use std::any::Any;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use nix::mount::MsFlags;
use nix::sched::CloneFlags;
use nix::sys::signal::Signal;
use nix::sys::stat::{Mode, SFlag};
use nix::unistd::Pid;

use super::Syscall;
use crate::error::SyscallError;

type Result<T> = std::result::Result<T, SyscallError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MountArgs {
    pub source: Option<PathBuf>,
    pub target: PathBuf,
    pub fstype: Option<String>,
    pub flags: MsFlags,
    pub data: Option<String>,
}

#[derive(Default)]
pub struct TestHelperSyscall {
    unshare_args: Mutex<Vec<CloneFlags>>,
    setns_args: Mutex<Vec<(i32, CloneFlags)>>,
    mount_args: Mutex<Vec<MountArgs>>,
    pivot_args: Mutex<Vec<PathBuf>>,
    hostname_args: Mutex<Vec<String>>,
    kill_args: Mutex<Vec<(Pid, Signal)>>,
}

impl Syscall for TestHelperSyscall {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn pivot_rootfs(&self, path: &Path) -> Result<()> {
        self.pivot_args.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }

    fn chroot(&self, _path: &Path) -> Result<()> {
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
        self.mount_args.lock().unwrap().push(MountArgs {
            source: source.map(|p| p.to_path_buf()),
            target: target.to_path_buf(),
            fstype: fstype.map(str::to_string),
            flags,
            data: data.map(str::to_string),
        });
        Ok(())
    }

    fn umount2(&self, _target: &Path) -> Result<()> {
        Ok(())
    }

    fn mknod(&self, _path: &Path, _kind: SFlag, _mode: Mode, _dev: u64) -> Result<()> {
        Ok(())
    }

    fn symlink(&self, _original: &Path, _link: &Path) -> Result<()> {
        Ok(())
    }

    fn unshare(&self, flags: CloneFlags) -> Result<()> {
        self.unshare_args.lock().unwrap().push(flags);
        Ok(())
    }

    fn set_ns(&self, fd: i32, nstype: CloneFlags) -> Result<()> {
        self.setns_args.lock().unwrap().push((fd, nstype));
        Ok(())
    }

    fn set_hostname(&self, hostname: &str) -> Result<()> {
        self.hostname_args.lock().unwrap().push(hostname.to_string());
        Ok(())
    }

    fn chdir(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn kill(&self, pid: Pid, signal: Signal) -> Result<()> {
        self.kill_args.lock().unwrap().push((pid, signal));
        Ok(())
    }
}

impl TestHelperSyscall {
    pub fn get_unshare_args(&self) -> Vec<CloneFlags> {
        self.unshare_args.lock().unwrap().clone()
    }

    pub fn get_setns_args(&self) -> Vec<(i32, CloneFlags)> {
        self.setns_args.lock().unwrap().clone()
    }

    pub fn get_mount_args(&self) -> Vec<MountArgs> {
        self.mount_args.lock().unwrap().clone()
    }

    pub fn get_pivot_args(&self) -> Vec<PathBuf> {
        self.pivot_args.lock().unwrap().clone()
    }
}
