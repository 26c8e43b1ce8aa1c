//! The Backend Selector (spec.md §4.6, §8): dispatches between the
//! container backend (the Lifecycle Controller in this crate) and a stub VM
//! backend that this revision does not implement.

use crate::container::Mode;
use crate::error::LifecycleError;

/// Parses the `-r/--runtime` CLI value into a backend mode.
pub fn parse_runtime(value: &str) -> Result<Mode, LifecycleError> {
    match value {
        "container" => Ok(Mode::Container),
        "vm" => Ok(Mode::Vm),
        other => Err(LifecycleError::SpecInvalid(format!(
            "unknown runtime backend {other:?}, expected \"container\" or \"vm\""
        ))),
    }
}

/// The VM backend is a stub: any operation against it fails with
/// `RuntimeUnsupported` rather than attempting anything (spec.md §3
/// invariant: "`mode = vm` records may exist but are refused by the
/// container backend").
pub fn ensure_container_mode(mode: Mode) -> Result<(), LifecycleError> {
    match mode {
        Mode::Container => Ok(()),
        Mode::Vm => Err(LifecycleError::RuntimeUnsupported),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_runtimes() {
        assert_eq!(parse_runtime("container").unwrap(), Mode::Container);
        assert_eq!(parse_runtime("vm").unwrap(), Mode::Vm);
        assert!(parse_runtime("qemu").is_err());
    }

    #[test]
    fn vm_mode_is_always_refused() {
        assert!(ensure_container_mode(Mode::Container).is_ok());
        assert!(matches!(
            ensure_container_mode(Mode::Vm),
            Err(LifecycleError::RuntimeUnsupported)
        ));
    }
}
