//! Populates `/dev` with the standard character devices and `/proc/self/fd`
//! symlinks (spec.md §4.3 step 3). All failures here are warnings.

use std::path::Path;

use nix::sys::stat::{Mode, SFlag};

use crate::syscall::Syscall;
use crate::utils::PathBufExt;

struct DeviceNode {
    name: &'static str,
    major: u64,
    minor: u64,
}

const DEVICES: &[DeviceNode] = &[
    DeviceNode {
        name: "null",
        major: 1,
        minor: 3,
    },
    DeviceNode {
        name: "zero",
        major: 1,
        minor: 5,
    },
    DeviceNode {
        name: "full",
        major: 1,
        minor: 7,
    },
    DeviceNode {
        name: "random",
        major: 1,
        minor: 8,
    },
    DeviceNode {
        name: "urandom",
        major: 1,
        minor: 9,
    },
    DeviceNode {
        name: "tty",
        major: 5,
        minor: 0,
    },
];

const SYMLINKS: &[(&str, &str)] = &[
    ("/proc/self/fd", "fd"),
    ("/proc/self/fd/0", "stdin"),
    ("/proc/self/fd/1", "stdout"),
    ("/proc/self/fd/2", "stderr"),
];

fn makedev(major: u64, minor: u64) -> u64 {
    (major << 8) | minor
}

pub fn populate_devices(syscall: &dyn Syscall, rootfs: &Path) {
    let mode = Mode::from_bits_truncate(0o666);
    for dev in DEVICES {
        let path = match rootfs.join_safely(format!("dev/{}", dev.name)) {
            Ok(p) => p,
            Err(err) => {
                log::warn!("skipping device node {}: {err}", dev.name);
                continue;
            }
        };

        if let Err(err) = syscall.mknod(&path, SFlag::S_IFCHR, mode, makedev(dev.major, dev.minor))
        {
            log::warn!("failed to create device node {path:?}: {err}");
        }
    }

    for (target, name) in SYMLINKS {
        let link = match rootfs.join_safely(format!("dev/{name}")) {
            Ok(p) => p,
            Err(err) => {
                log::warn!("skipping symlink dev/{name}: {err}");
                continue;
            }
        };

        if let Err(err) = syscall.symlink(Path::new(target), &link) {
            log::warn!("failed to create symlink {link:?} -> {target}: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn makedev_packs_major_minor() {
        assert_eq!(makedev(1, 3), (1u64 << 8) | 3);
        assert_eq!(makedev(5, 0), 5u64 << 8);
    }
}
