// CLASSIFICATION: COMMUNITY
// Filename: trace_pipe.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! TracePipeWatcher lifecycle: streaming, stop/wait-stop semantics and
//! failed-start behavior, using a regular file in place of the kernel
//! trace pipe.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::tempdir;

use kerntrace::fs::{ExistenceChecker, MountPoint, MountProbe};
use kerntrace::sync::CancelToken;
use kerntrace::trace::{TraceError, TracePipeWatcher};

struct Fixed(MountProbe);

impl ExistenceChecker for Fixed {
    fn probe(&self, _target: &Path) -> io::Result<MountProbe> {
        Ok(self.0)
    }
}

struct FailingProbe;

impl ExistenceChecker for FailingProbe {
    fn probe(&self, _target: &Path) -> io::Result<MountProbe> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "probe denied",
        ))
    }
}

fn debugfs_at(target: &Path, check: Box<dyn ExistenceChecker + Send + Sync>) -> MountPoint {
    MountPoint::new("debugfs", target, "debugfs", Some(check))
}

/// Sink capturing streamed bytes for later inspection.
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn contents(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }

    fn wait_for(&self, expected: &[u8]) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while self.contents() != expected {
            assert!(
                Instant::now() < deadline,
                "sink never received {:?}, got {:?}",
                expected,
                self.contents()
            );
            thread::sleep(Duration::from_millis(10));
        }
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn stop_before_start_is_a_noop() {
    let watcher = TracePipeWatcher::new(io::sink());
    watcher.stop();
    watcher.wait_stop();
}

#[test]
fn streams_pipe_contents_until_stopped() {
    let dir = tempdir().unwrap();
    let pipe = dir.path().join("trace_pipe");
    fs::write(&pipe, "sched_switch: prev=swapper next=cat\n").unwrap();
    let debugfs = debugfs_at(dir.path(), Box::new(Fixed(MountProbe::Mounted)));

    let sink = SharedSink::default();
    let mut watcher = TracePipeWatcher::with_pipe(&pipe, sink.clone());
    watcher.start(&debugfs).unwrap();

    sink.wait_for(b"sched_switch: prev=swapper next=cat\n");

    watcher.stop();
    // Double stop and a late wait are both safe.
    watcher.stop();
    watcher.wait_stop();
}

#[test]
fn second_start_is_rejected() {
    let dir = tempdir().unwrap();
    let pipe = dir.path().join("trace_pipe");
    fs::write(&pipe, "").unwrap();
    let debugfs = debugfs_at(dir.path(), Box::new(Fixed(MountProbe::Mounted)));

    let mut watcher = TracePipeWatcher::with_pipe(&pipe, io::sink());
    watcher.start(&debugfs).unwrap();
    assert!(matches!(
        watcher.start(&debugfs),
        Err(TraceError::AlreadyStarted)
    ));
    watcher.stop();
}

#[test]
fn parent_cancellation_stops_the_stream() {
    let dir = tempdir().unwrap();
    let pipe = dir.path().join("trace_pipe");
    fs::write(&pipe, "marker\n").unwrap();
    let debugfs = debugfs_at(dir.path(), Box::new(Fixed(MountProbe::Mounted)));

    let sink = SharedSink::default();
    let parent = CancelToken::new();
    let mut watcher = TracePipeWatcher::with_pipe(&pipe, sink.clone());
    watcher.start_with_token(&debugfs, &parent).unwrap();
    sink.wait_for(b"marker\n");

    parent.cancel();
    // The derived lifecycle shuts down without an explicit stop().
    watcher.wait_stop();
}

#[test]
fn missing_pipe_with_failing_mount_spawns_nothing() {
    let dir = tempdir().unwrap();
    let pipe = dir.path().join("absent").join("trace_pipe");
    let debugfs = debugfs_at(dir.path(), Box::new(FailingProbe));

    let mut watcher = TracePipeWatcher::with_pipe(&pipe, io::sink());
    let err = watcher.start(&debugfs).unwrap_err();
    assert!(matches!(err, TraceError::Mount(_)));

    // No lifecycle was started: both return immediately.
    watcher.wait_stop();
    watcher.stop();
}

#[test]
fn already_mounted_debugfs_is_tolerated() {
    let dir = tempdir().unwrap();
    let pipe = dir.path().join("trace_pipe");
    let debugfs = debugfs_at(dir.path(), Box::new(Fixed(MountProbe::Mounted)));

    // The pipe is missing, the mount reports "already exists", and
    // start proceeds to the open, which then fails on the pipe itself.
    let mut watcher = TracePipeWatcher::with_pipe(&pipe, io::sink());
    let err = watcher.start(&debugfs).unwrap_err();
    assert!(matches!(err, TraceError::Pipe(_)));
    watcher.wait_stop();
}

#[test]
fn failed_start_leaves_the_watcher_startable() {
    let dir = tempdir().unwrap();
    let pipe = dir.path().join("trace_pipe");
    let debugfs = debugfs_at(dir.path(), Box::new(Fixed(MountProbe::Mounted)));

    let sink = SharedSink::default();
    let mut watcher = TracePipeWatcher::with_pipe(&pipe, sink.clone());
    assert!(watcher.start(&debugfs).is_err());

    fs::write(&pipe, "late\n").unwrap();
    watcher.start(&debugfs).unwrap();
    sink.wait_for(b"late\n");
    watcher.stop();
}
