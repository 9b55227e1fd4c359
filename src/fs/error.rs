// CLASSIFICATION: COMMUNITY
// Filename: error.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-06-14

//! Error taxonomy for mount and pseudo-file operations.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Classified cause of a failed mount or file operation.
#[derive(Debug, Error)]
pub enum FsErrorKind {
    /// The existence check found the filesystem already mounted.
    #[error("mount point already exists")]
    AlreadyMounted,
    /// The existence check could not confirm the filesystem is present.
    #[error("mount point not exists")]
    NotMounted,
    /// The path resolved outside the mount target.
    #[error("path {} has another mount point", .0.display())]
    PathEscape(PathBuf),
    /// Underlying syscall or I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Failure of a [`MountPoint`](super::MountPoint) operation, carrying
/// the operation name and a description of the mount it ran against.
///
/// Callers classify by kind rather than by message:
/// [`FsError::is_already_mounted`] is the benign "someone mounted it
/// first" case, [`FsError::is_not_mounted`] the gate blocking file
/// access until a mount is confirmed.
#[derive(Debug, Error)]
#[error("{op} error; {mount}: {kind}")]
pub struct FsError {
    pub(crate) op: &'static str,
    pub(crate) mount: String,
    #[source]
    pub(crate) kind: FsErrorKind,
}

impl FsError {
    /// Name of the operation that failed (`"mount"`, `"read file"`, ...).
    pub fn op(&self) -> &str {
        self.op
    }

    /// Classified cause of the failure.
    pub fn kind(&self) -> &FsErrorKind {
        &self.kind
    }

    /// True when the filesystem was found already mounted.
    pub fn is_already_mounted(&self) -> bool {
        matches!(self.kind, FsErrorKind::AlreadyMounted)
    }

    /// True when the mount gate rejected a file operation.
    pub fn is_not_mounted(&self) -> bool {
        matches!(self.kind, FsErrorKind::NotMounted)
    }
}
