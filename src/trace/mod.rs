// CLASSIFICATION: COMMUNITY
// Filename: mod.rs v0.2
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Kernel function-trace control over the pseudo-filesystem layer.

pub mod events;
pub mod pipe;

pub use events::TraceEvents;
pub use pipe::{TraceError, TracePipeWatcher, TRACE_PIPE};
