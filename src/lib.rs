// CLASSIFICATION: COMMUNITY
// Filename: lib.rs v0.3
// Date Modified: 2026-08-02
// Author: Lukas Bower

//! Controlled access to Linux pseudo-filesystems and the kernel
//! trace interfaces layered on top of them.
//!
//! [`fs`] manages a small fixed set of well-known pseudo-filesystem
//! mounts (procfs, tracefs, debugfs, cgroup2, ...) with idempotent
//! mount handling and containment-checked file access. [`trace`]
//! drives kernel function tracing through those mounts: boot-requested
//! event toggling and live streaming of the trace ring buffer.

/// Pseudo-filesystem mount management and scoped file access.
pub mod fs;

/// Cancellation token and one-shot stop latch.
pub mod sync;

/// Trace event toggling and trace-pipe streaming.
pub mod trace;
