//! Raw `clone(2)` wrapper the Process Module uses to spawn the container
//! init process in one step, directly into the computed namespace flags,
//! rather than fork-then-unshare.

use std::mem;
use std::ptr;

use anyhow::{Context, Result};
use libc::{c_int, c_void};
use nix::errno::Errno;
use nix::sched::CloneFlags;
use nix::sys::mman;
use nix::sys::signal::Signal;
use nix::unistd::Pid;

/// Fixed child-stack size (spec.md §4.5 step 1: "allocates a child stack of
/// fixed size"). 8 MiB matches the stack rlimit the child sets for itself.
const CHILD_STACK_SIZE: usize = 8 * 1024 * 1024;

pub type CloneCb<'a> = Box<dyn FnMut() -> isize + 'a>;

/// Invokes `clone(2)` with `clone_flags` ORed with `SIGCHLD` so the new
/// process behaves like a fork child for wait purposes, running `cb` at its
/// entry point.
pub fn clone(mut cb: CloneCb<'_>, clone_flags: CloneFlags) -> Result<Pid> {
    extern "C" fn callback(data: *mut CloneCb<'_>) -> c_int {
        let cb: &mut CloneCb<'_> = unsafe { &mut *data };
        (*cb)() as c_int
    }

    let page_size: usize = unsafe {
        match libc::sysconf(libc::_SC_PAGE_SIZE) {
            -1 => 4 * 1024,
            x => x as usize,
        }
    };

    let child_stack = unsafe {
        mman::mmap(
            ptr::null_mut(),
            CHILD_STACK_SIZE,
            mman::ProtFlags::PROT_READ | mman::ProtFlags::PROT_WRITE,
            mman::MapFlags::MAP_PRIVATE | mman::MapFlags::MAP_ANONYMOUS | mman::MapFlags::MAP_STACK,
            -1,
            0,
        )
        .context("failed to mmap child stack")?
    };

    let combined = clone_flags.bits() | Signal::SIGCHLD as c_int;
    let res = unsafe {
        mman::mprotect(child_stack, page_size, mman::ProtFlags::PROT_NONE)
            .context("failed to create child stack guard page")?;

        let child_stack_top = child_stack.add(CHILD_STACK_SIZE);

        libc::clone(
            mem::transmute(callback as extern "C" fn(*mut CloneCb<'_>) -> i32),
            child_stack_top,
            combined,
            &mut cb as *mut _ as *mut c_void,
        )
    };

    Errno::result(res)
        .map(Pid::from_raw)
        .context("clone(2) failed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::wait::{waitpid, WaitStatus};
    use nix::unistd;

    #[test]
    fn clone_runs_callback_in_new_process() {
        let flags = CloneFlags::CLONE_NEWPID | CloneFlags::CLONE_NEWUSER;
        let pid = clone(
            Box::new(|| {
                if unistd::getpid() == Pid::from_raw(1) {
                    0
                } else {
                    1
                }
            }),
            flags,
        )
        .unwrap();

        match waitpid(pid, None).unwrap() {
            WaitStatus::Exited(p, status) => {
                assert_eq!(pid, p);
                assert_eq!(status, 0);
            }
            other => panic!("unexpected wait status: {other:?}"),
        }
    }

    #[test]
    fn clone_gives_callback_its_own_stack() {
        let pid = clone(
            Box::new(|| {
                let mut buf = [0u8; 4096];
                buf.iter_mut().for_each(|b| *b = 1);
                0
            }),
            CloneFlags::empty(),
        )
        .unwrap();

        match waitpid(pid, None).unwrap() {
            WaitStatus::Exited(p, status) => {
                assert_eq!(pid, p);
                assert_eq!(status, 0);
            }
            other => panic!("unexpected wait status: {other:?}"),
        }
    }
}
