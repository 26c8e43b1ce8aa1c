//! The Spec Provider: reads and validates `config.json` from a bundle
//! (spec.md §6). Only the fields the runtime actually consults are parsed;
//! anything else in the document is ignored rather than rejected, so a
//! richer OCI bundle still loads.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::LifecycleError;

#[derive(Debug, Deserialize)]
pub struct Spec {
    #[serde(rename = "ociVersion")]
    pub oci_version: Option<String>,
    pub process: Option<Process>,
    pub root: Option<Root>,
    pub hostname: Option<String>,
    #[serde(default)]
    pub mounts: Vec<Mount>,
    pub linux: Option<Linux>,
    #[serde(default)]
    pub annotations: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub terminal: bool,
    pub user: Option<User>,
    pub args: Option<Vec<String>>,
    #[serde(default)]
    pub env: Vec<String>,
    pub cwd: Option<String>,
    #[serde(rename = "noNewPrivileges", default)]
    pub no_new_privileges: bool,
    #[serde(rename = "consoleSize")]
    pub console_size: Option<ConsoleSize>,
}

#[derive(Debug, Deserialize)]
pub struct ConsoleSize {
    pub height: u32,
    pub width: u32,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub uid: u32,
    pub gid: u32,
}

#[derive(Debug, Deserialize)]
pub struct Root {
    pub path: String,
    #[serde(default)]
    pub readonly: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Mount {
    pub destination: String,
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub typ: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Linux {
    #[serde(default)]
    pub namespaces: Vec<LinuxNamespace>,
    #[serde(rename = "rootfsPropagation")]
    pub rootfs_propagation: Option<String>,
    pub resources: Option<LinuxResources>,
}

#[derive(Debug, Deserialize)]
pub struct LinuxNamespace {
    #[serde(rename = "type")]
    pub typ: String,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct LinuxResources {
    pub memory: Option<LinuxMemory>,
    pub cpu: Option<LinuxCpu>,
    pub pids: Option<LinuxPids>,
}

#[derive(Debug, Deserialize)]
pub struct LinuxMemory {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct LinuxCpu {
    pub shares: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct LinuxPids {
    pub limit: Option<i64>,
}

impl Spec {
    /// Loads and validates `<bundle>/config.json`.
    ///
    /// Per spec.md §7, a missing/malformed document, a missing `root.path`,
    /// or a missing/empty `process.args` are all `SpecInvalid`.
    pub fn load(bundle: &Path) -> Result<Spec, LifecycleError> {
        let path = bundle.join("config.json");
        let data = fs::read_to_string(&path)
            .map_err(|e| LifecycleError::SpecInvalid(format!("cannot read {path:?}: {e}")))?;
        let spec: Spec = serde_json::from_str(&data)
            .map_err(|e| LifecycleError::SpecInvalid(format!("cannot parse {path:?}: {e}")))?;
        spec.validate()?;
        Ok(spec)
    }

    fn validate(&self) -> Result<(), LifecycleError> {
        let root = self
            .root
            .as_ref()
            .ok_or_else(|| LifecycleError::SpecInvalid("missing root".into()))?;
        if root.path.is_empty() {
            return Err(LifecycleError::SpecInvalid("root.path is empty".into()));
        }
        let process = self
            .process
            .as_ref()
            .ok_or_else(|| LifecycleError::SpecInvalid("missing process".into()))?;
        match &process.args {
            Some(args) if !args.is_empty() => Ok(()),
            _ => Err(LifecycleError::SpecInvalid("process.args is missing or empty".into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, body: &str) {
        let mut f = fs::File::create(dir.join("config.json")).unwrap();
        f.write_all(body.as_bytes()).unwrap();
    }

    #[test]
    fn loads_minimal_valid_spec() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{
                "ociVersion": "1.0.2",
                "process": {"args": ["/bin/sh"], "cwd": "/"},
                "root": {"path": "rootfs"}
            }"#,
        );
        let spec = Spec::load(dir.path()).unwrap();
        assert_eq!(spec.root.unwrap().path, "rootfs");
    }

    #[test]
    fn rejects_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), r#"{"process": {"args": ["/bin/sh"]}}"#);
        assert!(matches!(
            Spec::load(dir.path()),
            Err(LifecycleError::SpecInvalid(_))
        ));
    }

    #[test]
    fn rejects_empty_process_args() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            r#"{"process": {"args": []}, "root": {"path": "rootfs"}}"#,
        );
        assert!(matches!(
            Spec::load(dir.path()),
            Err(LifecycleError::SpecInvalid(_))
        ));
    }

    #[test]
    fn rejects_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Spec::load(dir.path()),
            Err(LifecycleError::SpecInvalid(_))
        ));
    }
}
