// CLASSIFICATION: COMMUNITY
// Filename: pipe.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Live trace ring-buffer streaming.
//!
//! [`TracePipeWatcher`] tails the kernel trace pipe into a caller
//! supplied sink until cancelled. Shutdown closes the pipe handle from
//! a dedicated watcher thread, which is what unblocks the copy side;
//! the resulting read error is treated as end-of-stream, not a fault.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::mem::ManuallyDrop;
use std::os::unix::io::{FromRawFd, IntoRawFd, RawFd};
use std::path::PathBuf;
use std::thread;

use log::{debug, info};
use thiserror::Error;

use crate::fs::{FsError, MountPoint};
use crate::sync::{CancelToken, StopLatch};

/// Trace pipe exposed through the debugfs mount.
pub const TRACE_PIPE: &str = "/sys/kernel/debug/tracing/trace_pipe";

/// Errors surfaced by [`TracePipeWatcher::start`].
#[derive(Debug, Error)]
pub enum TraceError {
    /// The watcher already ran its single lifecycle.
    #[error("trace pipe watcher already started")]
    AlreadyStarted,
    /// Stat or open of the trace pipe failed.
    #[error("error opening trace pipe: {0}")]
    Pipe(#[source] io::Error),
    /// Mounting the backing filesystem failed.
    #[error("failed to mount trace pipe filesystem: {0}")]
    Mount(#[from] FsError),
}

/// Streams the kernel trace pipe to a sink with explicit
/// start/stop/wait-for-stop semantics.
///
/// One lifecycle per instance: a second [`start`](Self::start) is
/// rejected. [`stop`](Self::stop) and [`wait_stop`](Self::wait_stop)
/// are safe no-ops on a never-started watcher and safe to call
/// repeatedly afterwards.
pub struct TracePipeWatcher {
    pipe: PathBuf,
    sink: Option<Box<dyn Write + Send>>,
    token: Option<CancelToken>,
    stopped: Option<StopLatch>,
}

impl TracePipeWatcher {
    /// Watcher over the default [`TRACE_PIPE`] path.
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self::with_pipe(TRACE_PIPE, sink)
    }

    /// Watcher over an alternate trace pipe, e.g.
    /// `/sys/kernel/tracing/trace_pipe` where tracefs is mounted
    /// directly instead of through debugfs.
    pub fn with_pipe(pipe: impl Into<PathBuf>, sink: impl Write + Send + 'static) -> Self {
        Self {
            pipe: pipe.into(),
            sink: Some(Box::new(sink)),
            token: None,
            stopped: None,
        }
    }

    /// Watcher copying trace output to stdout.
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }

    /// Start streaming under a fresh top-level token.
    pub fn start(&mut self, debugfs: &MountPoint) -> Result<(), TraceError> {
        let parent = CancelToken::new();
        self.start_with_token(debugfs, &parent)
    }

    /// Start streaming; the lifecycle is additionally cancelled when
    /// `parent` is.
    ///
    /// When the pipe path is missing the backing filesystem is mounted
    /// first, tolerating "already mounted". Nothing is spawned unless
    /// the pipe was opened; a failed start leaves the watcher
    /// startable again.
    pub fn start_with_token(
        &mut self,
        debugfs: &MountPoint,
        parent: &CancelToken,
    ) -> Result<(), TraceError> {
        if self.stopped.is_some() {
            return Err(TraceError::AlreadyStarted);
        }

        match std::fs::metadata(&self.pipe) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if let Err(e) = debugfs.mount() {
                    if !e.is_already_mounted() {
                        return Err(TraceError::Mount(e));
                    }
                }
            }
            Err(e) => return Err(TraceError::Pipe(e)),
        }

        let file = File::open(&self.pipe).map_err(TraceError::Pipe)?;

        let token = parent.child();
        let stopped = StopLatch::new();
        let mut sink = self.sink.take().ok_or(TraceError::AlreadyStarted)?;
        let fd: RawFd = file.into_raw_fd();

        // Lifecycle watcher: sole closer of the pipe handle, sole
        // writer of the latch. The latch fires only after the close
        // returned, so a released stop() caller may assume the handle
        // is out of use.
        {
            let token = token.clone();
            let stopped = stopped.clone();
            thread::spawn(move || {
                token.wait();
                info!("closing trace pipe");
                unsafe { libc::close(fd) };
                stopped.fire();
            });
        }

        // Copy loop: reads until end-of-stream or until the close
        // above errors the read. Never closes the handle itself.
        thread::spawn(move || {
            let file = ManuallyDrop::new(unsafe { File::from_raw_fd(fd) });
            let mut reader = BufReader::new(&*file);
            if let Err(e) = io::copy(&mut reader, &mut sink) {
                debug!("trace pipe copy ended: {e}");
            }
        });

        self.token = Some(token);
        self.stopped = Some(stopped);
        Ok(())
    }

    /// Trigger shutdown and block until the pipe handle is closed.
    pub fn stop(&self) {
        if let Some(token) = &self.token {
            token.cancel();
        }
        self.wait_stop();
    }

    /// Block until shutdown completes; immediate when never started.
    pub fn wait_stop(&self) {
        if let Some(stopped) = &self.stopped {
            stopped.wait();
        }
    }
}
