//! Mount handling for the Filesystem Module: private-propagation remount,
//! the fixed default-mount table, and spec-supplied custom mounts.

use std::path::{Path, PathBuf};

use nix::mount::MsFlags;

use super::RootfsError;
use crate::syscall::Syscall;
use crate::utils::{create_dir_all_with_mode, PathBufExt};

type Result<T> = std::result::Result<T, RootfsError>;

const DIR_MODE: nix::sys::stat::Mode = nix::sys::stat::Mode::from_bits_truncate(0o755);

struct DefaultMount {
    target: &'static str,
    fstype: &'static str,
    flags: MsFlags,
    data: Option<&'static str>,
}

/// spec.md §4.3 step 2's fixed table.
const DEFAULT_MOUNTS: &[DefaultMount] = &[
    DefaultMount {
        target: "proc",
        fstype: "proc",
        flags: MsFlags::empty(),
        data: None,
    },
    DefaultMount {
        target: "sys",
        fstype: "sysfs",
        flags: MsFlags::empty(),
        data: None,
    },
    DefaultMount {
        target: "dev",
        fstype: "tmpfs",
        flags: MsFlags::from_bits_truncate(
            MsFlags::MS_NOSUID.bits() | MsFlags::MS_STRICTATIME.bits(),
        ),
        data: Some("mode=755"),
    },
    DefaultMount {
        target: "dev/pts",
        fstype: "devpts",
        flags: MsFlags::from_bits_truncate(MsFlags::MS_NOSUID.bits() | MsFlags::MS_NOEXEC.bits()),
        data: None,
    },
    DefaultMount {
        target: "dev/shm",
        fstype: "tmpfs",
        flags: MsFlags::from_bits_truncate(MsFlags::MS_NOSUID.bits() | MsFlags::MS_NODEV.bits()),
        data: None,
    },
    DefaultMount {
        target: "dev/mqueue",
        fstype: "tmpfs",
        flags: MsFlags::from_bits_truncate(MsFlags::MS_NOSUID.bits() | MsFlags::MS_NODEV.bits()),
        data: None,
    },
];

/// A custom mount requested by the bundle spec's `mounts` array.
#[derive(Debug, Clone)]
pub struct CustomMount {
    pub destination: PathBuf,
    pub source: Option<PathBuf>,
    pub fstype: Option<String>,
    pub options: Vec<String>,
}

impl CustomMount {
    fn flags(&self) -> MsFlags {
        let mut flags = MsFlags::empty();
        for opt in &self.options {
            match opt.as_str() {
                "ro" => flags |= MsFlags::MS_RDONLY,
                "nosuid" => flags |= MsFlags::MS_NOSUID,
                "noexec" => flags |= MsFlags::MS_NOEXEC,
                "nodev" => flags |= MsFlags::MS_NODEV,
                _ => {}
            }
        }
        flags
    }

    fn data(&self) -> Option<String> {
        let recognised = ["ro", "nosuid", "noexec", "nodev"];
        let rest: Vec<&str> = self
            .options
            .iter()
            .map(String::as_str)
            .filter(|o| !recognised.contains(o))
            .collect();
        if rest.is_empty() {
            None
        } else {
            Some(rest.join(","))
        }
    }
}

/// Remounts root `MS_PRIVATE | MS_REC` to stop mount events propagating to
/// the host (spec.md §4.3 step 1). Fatal on failure.
pub fn make_private(syscall: &dyn Syscall, rootfs: &Path) -> Result<()> {
    syscall
        .mount(
            None,
            Path::new("/"),
            None,
            MsFlags::MS_REC | MsFlags::MS_PRIVATE,
            None,
        )
        .map_err(RootfsError::PrivatePropagation)?;

    // Bind-mount the new root onto itself so it is guaranteed to be a mount
    // point, which `pivot_root(2)` requires.
    syscall
        .mount(
            Some(rootfs),
            rootfs,
            None,
            MsFlags::MS_BIND | MsFlags::MS_REC,
            None,
        )
        .map_err(RootfsError::PrivatePropagation)?;

    Ok(())
}

/// Mounts the fixed pseudo-filesystem table. Individual failures are
/// warnings, not fatal (spec.md §4.3 step 2).
pub fn mount_defaults(syscall: &dyn Syscall, rootfs: &Path) {
    for entry in DEFAULT_MOUNTS {
        let target = match rootfs.join_safely(entry.target) {
            Ok(t) => t,
            Err(err) => {
                log::warn!("skipping default mount {}: {err}", entry.target);
                continue;
            }
        };

        if let Err(err) = create_dir_all_with_mode(&target, DIR_MODE) {
            log::warn!("failed to create mount target {target:?}: {err}");
            continue;
        }

        if let Err(err) = syscall.mount(None, &target, Some(entry.fstype), entry.flags, entry.data)
        {
            log::warn!("default mount of {target:?} failed, continuing: {err}");
        }
    }
}

/// Mounts spec-supplied custom mounts. Individual failures are warnings
/// (spec.md §4.3 step 4).
pub fn mount_custom(syscall: &dyn Syscall, rootfs: &Path, mounts: &[CustomMount]) {
    for m in mounts {
        let target = match rootfs.join_safely(&m.destination) {
            Ok(t) => t,
            Err(err) => {
                log::warn!("skipping custom mount {:?}: {err}", m.destination);
                continue;
            }
        };

        if let Err(err) = create_dir_all_with_mode(&target, DIR_MODE) {
            log::warn!("failed to create custom mount target {target:?}: {err}");
            continue;
        }

        let data = m.data();
        if let Err(err) = syscall.mount(
            m.source.as_deref(),
            &target,
            m.fstype.as_deref(),
            m.flags(),
            data.as_deref(),
        ) {
            log::warn!("custom mount of {target:?} failed, continuing: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_options_translate_to_flags() {
        let m = CustomMount {
            destination: PathBuf::from("/data"),
            source: Some(PathBuf::from("/src")),
            fstype: Some("none".into()),
            options: vec!["ro".into(), "nosuid".into(), "size=10m".into()],
        };
        assert_eq!(m.flags(), MsFlags::MS_RDONLY | MsFlags::MS_NOSUID);
        assert_eq!(m.data().as_deref(), Some("size=10m"));
    }
}
