//! Shared constants and the raw file-write helpers every controller uses.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

pub const CGROUP_ROOT: &str = "/sys/fs/cgroup";

/// Resource limits a container may request; zero/`None` means "don't write
/// this file" (spec.md §4.4: limits are only applied when non-zero).
#[derive(Debug, Clone, Copy, Default)]
pub struct Limits {
    pub memory_max: Option<i64>,
    pub cpu_weight: Option<u64>,
    pub pids_max: Option<i64>,
}

#[derive(Debug, thiserror::Error)]
pub enum CgroupFileError {
    #[error("failed to open {path:?}")]
    Open {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path:?}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub fn write_cgroup_file<P: AsRef<Path>, T: ToString>(
    path: P,
    data: T,
) -> Result<(), CgroupFileError> {
    let path = path.as_ref();
    let mut file = OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(|source| CgroupFileError::Open {
            path: path.to_path_buf(),
            source,
        })?;
    file.write_all(data.to_string().as_bytes())
        .map_err(|source| CgroupFileError::Write {
            path: path.to_path_buf(),
            source,
        })
}

pub fn mkdir_idempotent(path: &Path) -> std::io::Result<()> {
    match fs::create_dir(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e),
    }
}
