// CLASSIFICATION: COMMUNITY
// Filename: check.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-06-14

//! Mount existence probing strategies.

use std::fs;
use std::io;
use std::path::Path;

/// Verdict of probing a mount target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountProbe {
    /// The filesystem is present at the target.
    Mounted,
    /// Nothing is mounted at the target yet.
    Unmounted,
}

/// Strategy deciding whether a pseudo-filesystem is already mounted at
/// a target directory.
///
/// Probes are re-run before every mount and file operation, so
/// implementations must be stateless with respect to the answer.
/// Errors are reserved for probes that could not reach a verdict
/// (permission denied on the target, I/O failure); "the marker is
/// absent" is a clean [`MountProbe::Unmounted`].
pub trait ExistenceChecker {
    /// Classify the mount state of `target`.
    fn probe(&self, target: &Path) -> io::Result<MountProbe>;
}

/// Checker probing a marker path known to exist only once the
/// filesystem is mounted: `self` under procfs, `available_events`
/// under tracefs, `tracing` under debugfs.
#[derive(Debug, Clone, Copy)]
pub struct MarkerCheck {
    marker: &'static str,
}

impl MarkerCheck {
    /// Checker for `target/<marker>`.
    pub const fn new(marker: &'static str) -> Self {
        Self { marker }
    }
}

impl ExistenceChecker for MarkerCheck {
    fn probe(&self, target: &Path) -> io::Result<MountProbe> {
        // Follows symlinks: the procfs marker `self` is one.
        match fs::metadata(target.join(self.marker)) {
            Ok(_) => Ok(MountProbe::Mounted),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(MountProbe::Unmounted),
            Err(e) => Err(e),
        }
    }
}
