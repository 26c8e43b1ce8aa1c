//! State-directory resolution (spec.md §4.1, §6): an explicit environment
//! override, then a fixed system directory when running as root, then a
//! directory under the caller's home, then a relative fallback. No rootless
//! or XDG_RUNTIME_DIR handling: this runtime has no rootless mode.

use std::path::PathBuf;

use anyhow::{bail, Result};
use libcontainer::utils::{create_dir_all_with_mode, is_root};
use nix::sys::stat::Mode;
use nix::unistd::getuid;

const RUN_DIR_ENV: &str = "NK_RUN_DIR";
const RUN_DIR_ENV_LEGACY: &str = "NS_RUN_DIR";

pub fn determine(root_path: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = root_path {
        if !path.exists() {
            create_dir_all_with_mode(&path, Mode::S_IRWXU)?;
        }
        return Ok(path.canonicalize()?);
    }

    if let Some(path) = env_override() {
        create_dir_all_with_mode(&path, Mode::S_IRWXU)?;
        return Ok(path);
    }

    if is_root() {
        let path = default_system_path();
        create_dir_all_with_mode(&path, Mode::S_IRWXU)?;
        return Ok(path);
    }

    if let Ok(home) = std::env::var("HOME") {
        if let Ok(resolved) = std::fs::canonicalize(&home) {
            let run_dir = resolved.join(".nanok/run");
            if create_dir_all_with_mode(&run_dir, Mode::S_IRWXU).is_ok() {
                return Ok(run_dir);
            }
        }
    }

    let fallback = relative_fallback(getuid().as_raw());
    if create_dir_all_with_mode(&fallback, Mode::S_IRWXU).is_ok() {
        return Ok(fallback);
    }

    bail!("could not find a storage location with suitable permissions for the current user");
}

fn env_override() -> Option<PathBuf> {
    std::env::var(RUN_DIR_ENV)
        .or_else(|_| std::env::var(RUN_DIR_ENV_LEGACY))
        .ok()
        .map(PathBuf::from)
}

#[cfg(not(test))]
fn default_system_path() -> PathBuf {
    PathBuf::from("/run/nanok")
}

#[cfg(test)]
fn default_system_path() -> PathBuf {
    std::env::temp_dir().join("default_nanok_path")
}

#[cfg(not(test))]
fn relative_fallback(uid: nix::libc::uid_t) -> PathBuf {
    PathBuf::from(format!("/tmp/nanok-{uid}"))
}

#[cfg(test)]
fn relative_fallback(uid: nix::libc::uid_t) -> PathBuf {
    std::env::temp_dir().join(format!("nanok-fallback-{uid}"))
}

#[cfg(test)]
mod tests {
    use std::fs::Permissions;
    use std::os::unix::fs::PermissionsExt;

    use anyhow::{Context, Result};
    use serial_test::serial;

    use super::*;

    #[test]
    fn user_specified_path_is_created_and_returned() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let specified = tmp.path().join("provided_path");
        let non_abs = specified.join("../provided_path");
        let path = determine(Some(non_abs)).context("failed with specified path")?;
        assert_eq!(path, specified);
        Ok(())
    }

    #[test]
    fn user_specified_existing_path_is_returned() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let specified = tmp.path().join("provided_path");
        std::fs::create_dir(&specified)?;
        let non_abs = specified.join("../provided_path");
        let path = determine(Some(non_abs)).context("failed with specified path")?;
        assert_eq!(path, specified);
        Ok(())
    }

    #[test]
    #[serial]
    fn env_override_wins_over_defaults() -> Result<()> {
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path().join("from_env");
        std::env::set_var(RUN_DIR_ENV, &dir);
        let path = determine(None).context("failed with env override")?;
        std::env::remove_var(RUN_DIR_ENV);
        assert_eq!(path, dir);
        assert!(path.exists());
        Ok(())
    }

    #[test]
    #[serial]
    fn legacy_env_override_is_honored_when_primary_is_unset() -> Result<()> {
        std::env::remove_var(RUN_DIR_ENV);
        let tmp = tempfile::tempdir()?;
        let dir = tmp.path().join("from_legacy_env");
        std::env::set_var(RUN_DIR_ENV_LEGACY, &dir);
        let path = determine(None).context("failed with legacy env override")?;
        std::env::remove_var(RUN_DIR_ENV_LEGACY);
        assert_eq!(path, dir);
        Ok(())
    }

    #[test]
    #[serial]
    fn non_root_falls_back_to_home_dir() -> Result<()> {
        if is_root() {
            return Ok(());
        }
        std::env::remove_var(RUN_DIR_ENV);
        std::env::remove_var(RUN_DIR_ENV_LEGACY);

        let tmp = tempfile::tempdir()?;
        let home = tmp.path().join("nanok_home");
        std::fs::create_dir_all(&home)?;
        std::env::set_var("HOME", &home);
        let path = determine(None).context("failed with $HOME path")?;
        std::env::remove_var("HOME");
        assert_eq!(path, home.join(".nanok/run"));
        assert!(path.exists());
        Ok(())
    }

    #[test]
    fn root_uses_fixed_system_path() -> Result<()> {
        if !is_root() {
            return Ok(());
        }
        let expected = default_system_path();
        let _ = std::fs::remove_dir_all(&expected);
        let path = determine(None).context("failed with default system path")?;
        assert_eq!(path, expected);
        assert!(path.exists());

        std::fs::set_permissions(&expected, Permissions::from_mode(Mode::S_IRUSR.bits()))
            .context("failed to set invalid permissions")?;
        assert!(determine(None).is_err());
        std::fs::set_permissions(&expected, Permissions::from_mode(0o755))?;
        std::fs::remove_dir_all(&expected)?;
        Ok(())
    }
}
