//! The execution context the Lifecycle Controller builds on `start` and
//! hands to the Process Module. Lives only for the duration of one spawn
//! (spec.md §3 "Execution context"): it is never persisted.

use std::path::PathBuf;

use crate::namespaces::NamespaceRequest;
use crate::rootfs::CustomMount;

pub struct ExecutionContext {
    pub rootfs: PathBuf,
    pub namespaces: Vec<NamespaceRequest>,
    pub cwd: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<String>,
    pub terminal: bool,
    pub hostname: Option<String>,
    pub mounts: Vec<CustomMount>,
}

/// The child's environment when the spec supplies none (spec.md §4.5
/// "Environment defaults").
pub fn default_env() -> Vec<String> {
    vec![
        "PATH=/usr/local/sbin:/usr/local/bin:/usr/sbin:/usr/bin:/sbin:/bin".to_string(),
        "TERM=xterm".to_string(),
        "HOME=/root".to_string(),
    ]
}
