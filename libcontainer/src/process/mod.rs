//! The Process Module (spec.md §4.5): spawns the container init process and
//! synchronises its readiness with the parent over a one-byte pipe.

pub mod args;
pub mod fork;

use std::ffi::CString;
use std::os::unix::io::RawFd;

use nix::sys::resource::{setrlimit, Resource};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

use crate::capabilities;
use crate::error::SyscallError;
use crate::namespaces::{NamespaceType, Namespaces};
use crate::pipe::{PipeError, ReadyPipe, FAILED, READY};
use crate::rootfs;
use crate::syscall::Syscall;

use self::args::ExecutionContext;

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Pipe(#[from] PipeError),
    #[error(transparent)]
    Clone(#[from] anyhow::Error),
    #[error("container init did not signal readiness")]
    ChildInitFailed,
}

/// Spawns the container init process per the spawn protocol and blocks until
/// its readiness byte (or failure) arrives. Does not wait for exit.
pub fn spawn(
    syscall: &dyn Syscall,
    namespaces: Namespaces,
    ctx: ExecutionContext,
) -> Result<Pid, ProcessError> {
    let pipe = ReadyPipe::new()?;
    let clone_flags = namespaces.clone_flags();

    namespaces
        .join_paths()
        .map_err(|e| ProcessError::Clone(e.into()))?;

    let write_end = pipe.write_end;
    let read_end = pipe.read_end;
    let uts_enabled = namespaces.get(NamespaceType::Uts).is_some();

    let cb: fork::CloneCb<'_> = Box::new(move || {
        match run_init(syscall, read_end, write_end, uts_enabled, &ctx) {
            Ok(()) => 0,
            Err(()) => 1,
        }
    });

    let pid = fork::clone(cb, clone_flags).map_err(ProcessError::Clone)?;

    pipe.close_write();
    let status = match pipe.recv() {
        Ok(byte) if byte == READY => Ok(()),
        _ => Err(ProcessError::ChildInitFailed),
    };
    pipe.close_read();

    match status {
        Ok(()) => Ok(pid),
        Err(err) => {
            let _ = waitpid(pid, None);
            Err(err)
        }
    }
}

/// Runs entirely in the child. Returns `Err(())` once a status byte has
/// already been written to the pipe (or the pipe is unusable), so the
/// caller's closure can translate it into an exit code without double
/// signalling.
fn run_init(
    syscall: &dyn Syscall,
    read_end: RawFd,
    write_end: RawFd,
    uts_enabled: bool,
    ctx: &ExecutionContext,
) -> Result<(), ()> {
    let _ = nix::unistd::close(read_end);

    if uts_enabled {
        if let Some(hostname) = &ctx.hostname {
            if let Err(err) = syscall.set_hostname(hostname) {
                log::warn!("failed to set hostname {hostname:?}: {err}");
            }
        }
    }

    if let Err(err) = rootfs::prepare_and_pivot(syscall, &ctx.rootfs, &ctx.mounts) {
        log::error!("filesystem setup failed: {err}");
        let _ = nix::unistd::write(write_end, &[FAILED]);
        return Err(());
    }

    if let Err(err) = syscall.chdir(&ctx.cwd) {
        log::warn!("chdir to {:?} failed, falling back to /: {err}", ctx.cwd);
        let _ = syscall.chdir(std::path::Path::new("/"));
    }

    capabilities::drop_all();

    if let Err(err) = setrlimit(Resource::RLIMIT_STACK, 8 * 1024 * 1024, u64::MAX) {
        log::warn!("failed to set stack rlimit: {err}");
    }

    if !ctx.terminal {
        if let Err(err) = nix::unistd::setsid() {
            log::warn!("failed to create new session: {err}");
        }
    }

    if nix::unistd::write(write_end, &[READY]).is_err() {
        return Err(());
    }
    let _ = nix::unistd::close(write_end);

    exec_payload(ctx)
}

fn exec_payload(ctx: &ExecutionContext) -> ! {
    let env = if ctx.env.is_empty() {
        args::default_env()
    } else {
        ctx.env.clone()
    };

    let c_args: Vec<CString> = ctx
        .args
        .iter()
        .map(|a| CString::new(a.as_bytes()).expect("argument must not contain NUL"))
        .collect();
    let c_env: Vec<CString> = env
        .iter()
        .map(|e| CString::new(e.as_bytes()).expect("env entry must not contain NUL"))
        .collect();

    match nix::unistd::execvpe(c_args[0].as_c_str(), &c_args, &c_env) {
        Ok(_) => unreachable!("execvpe does not return on success"),
        Err(err) => {
            eprintln!("failed to exec {:?}: {err}", ctx.args);
            std::process::exit(1);
        }
    }
}

/// Waits for the container init to exit and derives the numeric exit code
/// spec.md §4.6 `start(attach=true)` records: raw code on normal exit,
/// `128 + signal` on a signal.
pub fn wait_for_exit(pid: Pid) -> Result<i32, SyscallError> {
    loop {
        match waitpid(pid, None).map_err(SyscallError::from)? {
            WaitStatus::Exited(_, code) => return Ok(code),
            WaitStatus::Signaled(_, signal, _) => return Ok(128 + signal as i32),
            _ => continue,
        }
    }
}

/// `true` iff `pid` still refers to a live process. `pid` generally belongs
/// to a different invocation of this binary, so this checks via `kill(pid,
/// 0)` rather than `waitpid`, which only works on our own children.
pub fn is_alive(pid: Pid) -> bool {
    nix::sys::signal::kill(pid, None).is_ok()
}
