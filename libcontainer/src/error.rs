//! Error kinds shared across the lifecycle engine.
//!
//! Individual modules define their own `thiserror` enums for the failures
//! they can produce; this module holds the cross-cutting ones referenced
//! from more than one module, plus the wrapper that lets syscall call sites
//! mix `nix::Error` and `std::io::Error` without manual conversions at every
//! call site.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum SyscallError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Nix(#[from] nix::Error),
}

/// Errors a caller of the Lifecycle Controller can match on, corresponding
/// to the conceptual error kinds of the design (missing id, bad state
/// transition, and so on). The core otherwise reports via `anyhow::Error`.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("container {0} already exists")]
    AlreadyExists(String),
    #[error("container {0} does not exist")]
    NotFound(String),
    #[error("container {id} is in state {state:?}, which does not permit this operation")]
    BadState { id: String, state: String },
    #[error("vm backend is not supported by this runtime")]
    RuntimeUnsupported,
    #[error("container init did not signal readiness")]
    ChildInitFailed,
    #[error("bundle spec is invalid: {0}")]
    SpecInvalid(String),
    #[error("path {0:?} must not contain path separators")]
    InvalidId(PathBuf),
}
