// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Pseudo-filesystem mount management.
//!
//! [`MountPoint`] binds one well-known pseudo-filesystem to its target
//! directory and scopes all file access to that directory.
//! [`MountTable::well_known`] builds the fixed set of bindings the
//! tracing layer relies on.

mod check;
mod error;
mod mount;

pub use check::{ExistenceChecker, MarkerCheck, MountProbe};
pub use error::{FsError, FsErrorKind};
pub use mount::{MountFlags, MountPoint, UnmountFlags};

/// The fixed set of well-known pseudo-filesystem bindings.
///
/// Constructed once at process initialization and passed by reference
/// to the components that need it. Entries never change at runtime;
/// only the kernel mount table they describe does.
#[derive(Debug)]
pub struct MountTable {
    /// procfs at `/proc`.
    pub proc: MountPoint,
    /// tracefs at `/sys/kernel/tracing`.
    pub tracefs: MountPoint,
    /// debugfs at `/sys/kernel/debug`.
    pub debugfs: MountPoint,
    /// cgroup2 at `/sys/fs/cgroup`.
    pub cgroup2: MountPoint,
    /// tmpfs at `/tmp`.
    pub tmp: MountPoint,
    /// devtmpfs at `/dev`.
    pub dev: MountPoint,
}

impl MountTable {
    /// Build the well-known table.
    ///
    /// tmpfs and devtmpfs have no marker path distinguishing them from
    /// a plain directory, so those bindings carry no existence check
    /// and their file operations are not gated.
    pub fn well_known() -> Self {
        Self {
            proc: MountPoint::new(
                "proc",
                "/proc",
                "proc",
                Some(Box::new(MarkerCheck::new("self"))),
            ),
            tracefs: MountPoint::new(
                "tracefs",
                "/sys/kernel/tracing",
                "tracefs",
                Some(Box::new(MarkerCheck::new("available_events"))),
            ),
            debugfs: MountPoint::new(
                "debugfs",
                "/sys/kernel/debug",
                "debugfs",
                Some(Box::new(MarkerCheck::new("tracing"))),
            ),
            cgroup2: MountPoint::new(
                "cgroup2",
                "/sys/fs/cgroup",
                "cgroup2",
                Some(Box::new(MarkerCheck::new("cgroup.controllers"))),
            ),
            tmp: MountPoint::new("tmpfs", "/tmp", "tmpfs", None),
            dev: MountPoint::new("udev", "/dev", "devtmpfs", None),
        }
    }
}
