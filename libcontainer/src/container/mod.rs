//! The Lifecycle Controller (spec.md §4.6): the top-level state machine that
//! coordinates the Spec Provider, State Store, and the Namespace/Filesystem/
//! Cgroup/Process modules across the six operations the CLI exposes.

pub mod state;

use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::Duration;

use nix::sys::signal::Signal as NixSignal;
use nix::unistd::Pid;

use libcgroups::{Limits, Manager as CgroupManager};

use crate::backend;
use crate::error::LifecycleError;
use crate::namespaces::{NamespaceRequest, NamespaceType, Namespaces};
use crate::process::args::ExecutionContext;
use crate::rootfs::CustomMount;
use crate::spec::Spec;
use crate::syscall::create_syscall;
use crate::utils::validate_id;

use self::state::{ContainerRecord, ContainerState, RuntimeMode, StateStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Container,
    Vm,
}

impl From<Mode> for RuntimeMode {
    fn from(m: Mode) -> Self {
        match m {
            Mode::Container => RuntimeMode::Container,
            Mode::Vm => RuntimeMode::Vm,
        }
    }
}

impl From<RuntimeMode> for Mode {
    fn from(m: RuntimeMode) -> Self {
        match m {
            RuntimeMode::Container => Mode::Container,
            RuntimeMode::Vm => Mode::Vm,
        }
    }
}

pub struct CreateOpts {
    pub id: String,
    pub bundle: PathBuf,
    pub mode: Mode,
}

pub struct RunOpts {
    pub id: String,
    pub bundle: PathBuf,
    pub mode: Mode,
    pub attach: bool,
    pub rm: bool,
}

pub struct Controller {
    store: StateStore,
}

impl Controller {
    pub fn new(state_dir: PathBuf) -> Self {
        Self {
            store: StateStore::new(state_dir),
        }
    }

    pub fn create(&self, opts: CreateOpts) -> anyhow::Result<()> {
        validate_id(&opts.id)?;

        if self.store.exists(&opts.id) {
            return Err(LifecycleError::AlreadyExists(opts.id).into());
        }

        // Validate the spec but don't keep it: `start` reloads it fresh, and
        // a validation failure here must leave no record behind.
        Spec::load(&opts.bundle)?;

        let record = ContainerRecord {
            id: opts.id,
            bundle_path: opts.bundle,
            state: ContainerState::Created,
            mode: opts.mode.into(),
            pid: 0,
        };
        self.store.save(&record)?;
        Ok(())
    }

    /// Returns the child's exit code when `attach` is true, `None` when
    /// detached.
    pub fn start(&self, id: &str, attach: bool) -> anyhow::Result<Option<i32>> {
        validate_id(id)?;
        let mut record = self.store.load(id)?;

        backend::ensure_container_mode(record.mode.into())?;
        if record.state != ContainerState::Created {
            return Err(LifecycleError::BadState {
                id: id.to_string(),
                state: format!("{:?}", record.state),
            }
            .into());
        }

        let spec = Spec::load(&record.bundle_path)?;
        let ctx = build_execution_context(&record.bundle_path, &spec)?;
        let namespace_requests = namespace_requests_from_spec(&spec);
        let limits = limits_from_spec(&spec);

        let cgroups = CgroupManager::new(id);
        cgroups.setup(&limits);

        let syscall = create_syscall();
        let namespaces = Namespaces::new(create_syscall(), namespace_requests);
        let pid = crate::process::spawn(syscall.as_ref(), namespaces, ctx)?;

        if let Err(err) = cgroups.attach(pid) {
            // A cgroup.procs write failure is fatal (spec.md §4.4 `attach`):
            // kill the orphaned init rather than leave an unmanaged process.
            let _ = nix::sys::signal::kill(pid, NixSignal::SIGKILL);
            return Err(err.into());
        }

        record.state = ContainerState::Running;
        record.pid = pid.as_raw();
        // A save failure here is a warning, not an error: the process is
        // already running (spec.md §4.6 "Failure-to-reconcile policy").
        if let Err(err) = self.store.save(&record) {
            log::warn!("failed to persist running state for {id}: {err}");
        }

        if !attach {
            return Ok(None);
        }

        let code = crate::process::wait_for_exit(pid)?;
        record.state = ContainerState::Stopped;
        record.pid = 0;
        if let Err(err) = self.store.save(&record) {
            log::warn!("failed to persist stopped state for {id}: {err}");
        }
        Ok(Some(code))
    }

    pub fn run(&self, opts: RunOpts) -> anyhow::Result<Option<i32>> {
        if opts.rm && !opts.attach {
            anyhow::bail!("--rm requires attached mode");
        }

        self.create(CreateOpts {
            id: opts.id.clone(),
            bundle: opts.bundle,
            mode: opts.mode,
        })?;

        let result = self.start(&opts.id, opts.attach);

        if opts.rm {
            if let Err(err) = self.delete(&opts.id) {
                log::warn!("best-effort delete after --rm failed: {err}");
            }
        }

        result
    }

    /// Joins the namespaces of a running container's init process and runs
    /// `command` (or an interactive shell) inside them via `nsenter` on
    /// `PATH` (spec.md §4.6 `exec`, §6 "External tool").
    pub fn exec(&self, id: &str, command: Option<String>) -> anyhow::Result<i32> {
        validate_id(id)?;
        let mut record = self.store.load(id)?;

        if record.state != ContainerState::Running || record.pid <= 0 {
            return Err(LifecycleError::BadState {
                id: id.to_string(),
                state: format!("{:?}", record.state),
            }
            .into());
        }

        let pid = Pid::from_raw(record.pid);
        if !crate::process::is_alive(pid) {
            record.state = ContainerState::Stopped;
            record.pid = 0;
            let _ = self.store.save(&record);
            anyhow::bail!("container {id} init process is no longer alive");
        }

        let ns_path = format!("/proc/{}/ns/pid", record.pid);
        if !Path::new(&ns_path).exists() {
            log::warn!("namespace handles for {id} are not visible, proceeding anyway");
        }

        let mut argv = vec![
            "nsenter".to_string(),
            "--target".to_string(),
            record.pid.to_string(),
            "--mount".to_string(),
            "--uts".to_string(),
            "--ipc".to_string(),
            "--net".to_string(),
            "--pid".to_string(),
            "--".to_string(),
        ];
        // A caller-provided command runs through a login shell (spec.md §4.6
        // `exec`), matching the original's `/bin/sh -lc <command>`; with no
        // command, an interactive shell is launched instead.
        match command {
            Some(cmd) if !cmd.is_empty() => {
                argv.push("/bin/sh".to_string());
                argv.push("-lc".to_string());
                argv.push(cmd);
            }
            _ => argv.push("/bin/sh".to_string()),
        }

        let status = std::process::Command::new(&argv[0]).args(&argv[1..]).status();
        match status {
            Ok(status) => Ok(exit_code_from_status(status)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::warn!("namespace-entry helper not found on PATH");
                Ok(127)
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn delete(&self, id: &str) -> anyhow::Result<()> {
        validate_id(id)?;
        let record = self.store.load(id)?;

        if record.state == ContainerState::Running && record.pid > 0 {
            let pid = Pid::from_raw(record.pid);
            if let Err(err) = nix::sys::signal::kill(pid, NixSignal::SIGTERM) {
                log::warn!("failed to send SIGTERM to {id}: {err}");
            }
            sleep(Duration::from_millis(100));
            if crate::process::is_alive(pid) {
                if let Err(err) = nix::sys::signal::kill(pid, NixSignal::SIGKILL) {
                    log::warn!("failed to send SIGKILL to {id}: {err}");
                }
            }
        }

        CgroupManager::new(id).cleanup();

        self.store.delete(id)?;
        Ok(())
    }

    /// Returns `None` when the record is missing; the CLI renders this as
    /// `unknown` with a non-zero exit.
    pub fn state(&self, id: &str) -> Option<ContainerState> {
        self.store.load(id).ok().map(|r| r.state)
    }

    /// Returns the init pid of a running container, for `--pid-file` support
    /// after a detached `start`/`run` (spec.md §6).
    pub fn pid(&self, id: &str) -> Option<i32> {
        self.store
            .load(id)
            .ok()
            .filter(|r| r.pid > 0)
            .map(|r| r.pid)
    }
}

fn exit_code_from_status(status: std::process::ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match status.code() {
        Some(code) => code,
        None => 128 + status.signal().unwrap_or(0),
    }
}

fn namespace_requests_from_spec(spec: &Spec) -> Vec<NamespaceRequest> {
    let Some(linux) = &spec.linux else {
        return Vec::new();
    };
    linux
        .namespaces
        .iter()
        .map(|ns| {
            let typ = NamespaceType::from_spec_str(&ns.typ);
            NamespaceRequest::new(typ, ns.path.as_ref().map(PathBuf::from))
        })
        .collect()
}

fn limits_from_spec(spec: &Spec) -> Limits {
    let Some(resources) = spec.linux.as_ref().and_then(|l| l.resources.as_ref()) else {
        return Limits::default();
    };
    Limits {
        memory_max: resources.memory.as_ref().and_then(|m| m.limit),
        cpu_weight: resources.cpu.as_ref().and_then(|c| c.shares),
        pids_max: resources.pids.as_ref().and_then(|p| p.limit),
    }
}

fn build_execution_context(bundle: &Path, spec: &Spec) -> anyhow::Result<ExecutionContext> {
    let root = spec
        .root
        .as_ref()
        .ok_or_else(|| LifecycleError::SpecInvalid("missing root".into()))?;
    let process = spec
        .process
        .as_ref()
        .ok_or_else(|| LifecycleError::SpecInvalid("missing process".into()))?;
    let args = process
        .args
        .clone()
        .ok_or_else(|| LifecycleError::SpecInvalid("missing process.args".into()))?;

    let mounts = spec
        .mounts
        .iter()
        .map(|m| CustomMount {
            destination: PathBuf::from(&m.destination),
            source: m.source.as_ref().map(PathBuf::from),
            fstype: m.typ.clone(),
            options: m.options.clone(),
        })
        .collect();

    Ok(ExecutionContext {
        rootfs: bundle.join(&root.path),
        namespaces: namespace_requests_from_spec(spec),
        cwd: PathBuf::from(process.cwd.clone().unwrap_or_else(|| "/".to_string())),
        args,
        env: process.env.clone(),
        terminal: process.terminal,
        hostname: spec.hostname.clone(),
        mounts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_bundle(dir: &Path, args: &str) {
        std::fs::create_dir_all(dir.join("rootfs")).unwrap();
        let mut f = std::fs::File::create(dir.join("config.json")).unwrap();
        write!(
            f,
            r#"{{"process": {{"args": [{args}]}}, "root": {{"path": "rootfs"}}}}"#
        )
        .unwrap();
    }

    #[test]
    fn create_persists_a_created_record() {
        let state_dir = tempfile::tempdir().unwrap();
        let bundle_dir = tempfile::tempdir().unwrap();
        write_bundle(bundle_dir.path(), r#""/bin/true""#);

        let controller = Controller::new(state_dir.path().to_path_buf());
        controller
            .create(CreateOpts {
                id: "c1".to_string(),
                bundle: bundle_dir.path().to_path_buf(),
                mode: Mode::Container,
            })
            .unwrap();

        assert_eq!(controller.state("c1"), Some(ContainerState::Created));
    }

    #[test]
    fn duplicate_create_is_rejected() {
        let state_dir = tempfile::tempdir().unwrap();
        let bundle_dir = tempfile::tempdir().unwrap();
        write_bundle(bundle_dir.path(), r#""/bin/true""#);

        let controller = Controller::new(state_dir.path().to_path_buf());
        let opts = || CreateOpts {
            id: "c2".to_string(),
            bundle: bundle_dir.path().to_path_buf(),
            mode: Mode::Container,
        };
        controller.create(opts()).unwrap();
        assert!(controller.create(opts()).is_err());
    }

    #[test]
    fn vm_mode_start_is_unsupported() {
        let state_dir = tempfile::tempdir().unwrap();
        let bundle_dir = tempfile::tempdir().unwrap();
        write_bundle(bundle_dir.path(), r#""/bin/true""#);

        let controller = Controller::new(state_dir.path().to_path_buf());
        controller
            .create(CreateOpts {
                id: "c3".to_string(),
                bundle: bundle_dir.path().to_path_buf(),
                mode: Mode::Vm,
            })
            .unwrap();

        let err = controller.start("c3", false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::RuntimeUnsupported)
        ));
        assert_eq!(controller.state("c3"), Some(ContainerState::Created));
    }

    #[test]
    fn state_of_missing_container_is_none() {
        let state_dir = tempfile::tempdir().unwrap();
        let controller = Controller::new(state_dir.path().to_path_buf());
        assert_eq!(controller.state("ghost"), None);
    }
}
