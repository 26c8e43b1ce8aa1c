//! Small filesystem and path helpers shared across the container lifecycle.

use std::fs::{self, DirBuilder};
use std::os::unix::fs::DirBuilderExt;
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context, Result};
use nix::sys::stat::Mode;
use nix::unistd::Uid;

pub trait PathBufExt {
    /// Joins `path` onto `self`, treating an absolute `path` as relative to
    /// `self` instead of replacing it outright (as `Path::join` would).
    fn join_safely<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf>;
    /// Resolves `.`/`..` components without touching the filesystem.
    fn normalize(&self) -> PathBuf;
}

impl PathBufExt for Path {
    fn join_safely<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf> {
        let path = path.as_ref();
        if path.is_relative() {
            return Ok(self.join(path));
        }

        let stripped = path
            .strip_prefix("/")
            .with_context(|| format!("failed to strip prefix from {}", path.display()))?;
        Ok(self.join(stripped))
    }

    fn normalize(&self) -> PathBuf {
        let mut out = PathBuf::new();
        for component in self.components() {
            match component {
                Component::ParentDir => {
                    out.pop();
                }
                Component::CurDir => {}
                c => out.push(c),
            }
        }
        out
    }
}

/// Creates `path` (and parents) with the given mode, tolerating a
/// pre-existing directory left by a racing invocation.
pub fn create_dir_all_with_mode<P: AsRef<Path>>(path: P, mode: Mode) -> Result<()> {
    let path = path.as_ref();
    match DirBuilder::new()
        .recursive(true)
        .mode(mode.bits())
        .create(path)
    {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => Ok(()),
        Err(e) => Err(e).with_context(|| format!("failed to create directory {path:?}")),
    }
}

/// Resolves an absolute-or-relative bundle/root path against the current
/// directory, without requiring the path to already exist.
pub fn canonicalize_bundle_relative<P: AsRef<Path>>(base: &Path, path: P) -> Result<PathBuf> {
    let joined = base.join(path);
    if joined.exists() {
        joined
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {joined:?}"))
    } else {
        bail!("path does not exist: {joined:?}")
    }
}

/// Is the given id safe to use as a single path component?
pub fn validate_id(id: &str) -> Result<()> {
    if id.is_empty() {
        bail!("container id must not be empty");
    }
    if id.contains('/') || id == "." || id == ".." {
        bail!("container id must not contain path separators: {id:?}");
    }
    Ok(())
}

pub fn is_root() -> bool {
    Uid::effective().is_root()
}

pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
    fs::write(&path, contents)
        .with_context(|| format!("failed to write {}", path.as_ref().display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_safely_relative() {
        let base = Path::new("/a/b");
        assert_eq!(base.join_safely("c").unwrap(), PathBuf::from("/a/b/c"));
    }

    #[test]
    fn join_safely_absolute() {
        let base = Path::new("/a/b");
        assert_eq!(base.join_safely("/c/d").unwrap(), PathBuf::from("/a/b/c/d"));
    }

    #[test]
    fn normalize_dots() {
        let p = Path::new("/a/./b/../c");
        assert_eq!(p.normalize(), PathBuf::from("/a/c"));
    }

    #[test]
    fn validate_id_rejects_separators() {
        assert!(validate_id("").is_err());
        assert!(validate_id("a/b").is_err());
        assert!(validate_id("..").is_err());
        assert!(validate_id("c1").is_ok());
    }
}
