// CLASSIFICATION: COMMUNITY
// Filename: mount.rs v0.4
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Mount-point binding with containment-checked file access.

use std::ffi::CString;
use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Component, Path, PathBuf};

use bitflags::bitflags;

use super::check::{ExistenceChecker, MountProbe};
use super::error::{FsError, FsErrorKind};

bitflags! {
    /// Flags accepted by [`MountPoint::mount_with_flags`].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct MountFlags: libc::c_ulong {
        const RDONLY = libc::MS_RDONLY;
        const NOSUID = libc::MS_NOSUID;
        const NODEV = libc::MS_NODEV;
        const NOEXEC = libc::MS_NOEXEC;
        const NOATIME = libc::MS_NOATIME;
        const RELATIME = libc::MS_RELATIME;
    }
}

bitflags! {
    /// Flags accepted by [`MountPoint::unmount`].
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct UnmountFlags: libc::c_int {
        const FORCE = libc::MNT_FORCE;
        const DETACH = libc::MNT_DETACH;
        const EXPIRE = libc::MNT_EXPIRE;
        const NOFOLLOW = libc::UMOUNT_NOFOLLOW;
    }
}

/// One pseudo-filesystem binding: source, absolute target directory,
/// filesystem type and an optional existence check.
///
/// File operations are scoped to the target directory: relative paths
/// join under it and the joined path must stay lexically contained, so
/// a caller-supplied `..` can never reach another mount. Instances are
/// immutable after construction and safe to share across threads; the
/// mount table itself is process-global state, so concurrent
/// mount/unmount of the *same* binding is the caller's problem.
pub struct MountPoint {
    source: String,
    target: PathBuf,
    fs_type: String,
    check: Option<Box<dyn ExistenceChecker + Send + Sync>>,
}

impl fmt::Display for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mount[type={}, target={}]",
            self.fs_type,
            self.target.display()
        )
    }
}

impl fmt::Debug for MountPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountPoint")
            .field("source", &self.source)
            .field("target", &self.target)
            .field("fs_type", &self.fs_type)
            .field("check", &self.check.is_some())
            .finish()
    }
}

impl MountPoint {
    /// Create a binding. `target` must be an absolute path.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<PathBuf>,
        fs_type: impl Into<String>,
        check: Option<Box<dyn ExistenceChecker + Send + Sync>>,
    ) -> Self {
        let target = target.into();
        debug_assert!(target.is_absolute(), "mount target must be absolute");
        Self {
            source: source.into(),
            target,
            fs_type: fs_type.into(),
            check,
        }
    }

    /// Mount source device or identifier.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Absolute directory the filesystem attaches to.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Filesystem type passed to the mount syscall.
    pub fn fs_type(&self) -> &str {
        &self.fs_type
    }

    fn err(&self, op: &'static str, kind: FsErrorKind) -> FsError {
        FsError {
            op,
            mount: self.to_string(),
            kind,
        }
    }

    /// Mount with no extra flags.
    pub fn mount(&self) -> Result<(), FsError> {
        self.mount_with_flags(MountFlags::empty())
    }

    /// Probe the target (when a check is configured), create the
    /// target directory and invoke the mount syscall.
    ///
    /// An existing mount surfaces as [`FsErrorKind::AlreadyMounted`]
    /// before the syscall runs; callers wanting idempotence treat
    /// [`FsError::is_already_mounted`] as success. Pseudo-filesystems
    /// take no mount options, so the data argument is always empty.
    pub fn mount_with_flags(&self, flags: MountFlags) -> Result<(), FsError> {
        if let Some(check) = &self.check {
            match check.probe(&self.target) {
                Ok(MountProbe::Unmounted) => {}
                Ok(MountProbe::Mounted) => {
                    return Err(self.err("check mount point", FsErrorKind::AlreadyMounted))
                }
                Err(e) => return Err(self.err("check mount point", e.into())),
            }
        }

        fs::create_dir_all(&self.target).map_err(|e| self.err("mount", e.into()))?;

        let source = cstr(self.source.as_bytes()).map_err(|e| self.err("mount", e.into()))?;
        let target =
            cstr(self.target.as_os_str().as_bytes()).map_err(|e| self.err("mount", e.into()))?;
        let fs_type = cstr(self.fs_type.as_bytes()).map_err(|e| self.err("mount", e.into()))?;

        let rc = unsafe {
            libc::mount(
                source.as_ptr(),
                target.as_ptr(),
                fs_type.as_ptr(),
                flags.bits(),
                b"\0".as_ptr().cast(),
            )
        };
        if rc != 0 {
            return Err(self.err("mount", io::Error::last_os_error().into()));
        }
        Ok(())
    }

    /// Invoke the unmount syscall. Failures are returned unwrapped for
    /// the caller to classify.
    pub fn unmount(&self, flags: UnmountFlags) -> io::Result<()> {
        let target = cstr(self.target.as_os_str().as_bytes())?;
        let rc = unsafe { libc::umount2(target.as_ptr(), flags.bits()) };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(())
    }

    /// Read a file under the mount target.
    pub fn read_file(&self, path: impl AsRef<Path>) -> Result<Vec<u8>, FsError> {
        const OP: &str = "read file";
        self.ensure_mounted(OP)?;
        let path = self.resolve(OP, path.as_ref())?;
        fs::read(&path).map_err(|e| self.err(OP, e.into()))
    }

    /// Resolve a symlink under the mount target.
    pub fn read_link(&self, path: impl AsRef<Path>) -> Result<PathBuf, FsError> {
        const OP: &str = "read link";
        self.ensure_mounted(OP)?;
        let path = self.resolve(OP, path.as_ref())?;
        fs::read_link(&path).map_err(|e| self.err(OP, e.into()))
    }

    /// Write `contents` to a file under the mount target, creating it
    /// with `mode` permission bits when absent. No newline is appended;
    /// tracefs control files do not require one.
    pub fn write_file(
        &self,
        path: impl AsRef<Path>,
        contents: &str,
        mode: u32,
    ) -> Result<(), FsError> {
        const OP: &str = "write file";
        self.ensure_mounted(OP)?;
        let path = self.resolve(OP, path.as_ref())?;
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(mode)
            .open(&path)
            .map_err(|e| self.err(OP, e.into()))?;
        file.write_all(contents.as_bytes())
            .map_err(|e| self.err(OP, e.into()))
    }

    /// Conservative gate for file operations: a configured check must
    /// positively confirm the mount. A clean "not mounted" and an
    /// inconclusive probe are both rejected; bindings without a check
    /// carry no gate.
    fn ensure_mounted(&self, op: &'static str) -> Result<(), FsError> {
        if let Some(check) = &self.check {
            match check.probe(&self.target) {
                Ok(MountProbe::Mounted) => {}
                Ok(MountProbe::Unmounted) | Err(_) => {
                    return Err(self.err(op, FsErrorKind::NotMounted))
                }
            }
        }
        Ok(())
    }

    /// Join `path` under the target and verify the result stays
    /// lexically contained within it.
    fn resolve(&self, op: &'static str, path: &Path) -> Result<PathBuf, FsError> {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.target.join(path)
        };
        let resolved = normalize(&joined);
        if !resolved.starts_with(&self.target) {
            return Err(self.err(op, FsErrorKind::PathEscape(resolved)));
        }
        Ok(resolved)
    }
}

/// Lexically normalize a path: drop `.`, pop `..` against the prior
/// component, never consult the filesystem. `..` at the root stays at
/// the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for comp in path.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn cstr(bytes: &[u8]) -> io::Result<CString> {
    CString::new(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))
}
