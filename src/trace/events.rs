// CLASSIFICATION: COMMUNITY
// Filename: events.rs v0.3
// Author: Lukas Bower
// Date Modified: 2026-08-02

//! Boot-requested trace events and their tracefs enable flags.

use log::{debug, warn};

use crate::fs::{FsError, MountPoint};

/// Subsystem assumed for bare event names on the kernel command line.
const DEFAULT_SUBSYSTEM: &str = "syscalls";

/// Kernel command-line parameter listing events to trace.
const CMDLINE_PARAM: &str = "trace_events=";

/// Ordered list of trace event specifiers (`subsystem:event`).
///
/// Populated once from the kernel command line at process start and
/// immutable afterwards; enabling and disabling only touches tracefs,
/// never the in-memory list. Duplicates are preserved in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceEvents {
    events: Vec<String>,
}

impl TraceEvents {
    /// Parse a raw kernel command line.
    ///
    /// The raw buffer may be NUL-terminated and bracket-wrapped
    /// depending on the boot loader; those characters are trimmed
    /// before tokenizing on whitespace. Every `trace_events=<csv>`
    /// token contributes its entries in order, and entries without a
    /// `:` get the `syscalls:` default prefix.
    pub fn parse(cmdline: &str) -> Self {
        let mut events = Vec::new();
        let trimmed = cmdline.trim_matches(|c| c == '\0' || c == '[' || c == ']');
        for arg in trimmed.split_whitespace() {
            let Some(csv) = arg.strip_prefix(CMDLINE_PARAM) else {
                continue;
            };
            for event in csv.split(',') {
                if event.is_empty() {
                    continue;
                }
                if event.contains(':') {
                    events.push(event.to_string());
                } else {
                    events.push(format!("{DEFAULT_SUBSYSTEM}:{event}"));
                }
            }
        }
        Self { events }
    }

    /// Bootstrap from `cmdline` through the procfs mount, mounting
    /// procfs first when needed.
    ///
    /// "Already mounted" is the normal case on a booted system and is
    /// treated as success; any other mount or read failure is returned
    /// and should be treated as fatal by startup code.
    pub fn from_kernel_cmdline(proc: &MountPoint) -> Result<Self, FsError> {
        if let Err(e) = proc.mount() {
            if !e.is_already_mounted() {
                return Err(e);
            }
        }
        let raw = proc.read_file("cmdline")?;
        let cmdline = String::from_utf8_lossy(&raw);
        debug!("bootstrap params: {}", cmdline.trim_end());
        Ok(Self::parse(&cmdline))
    }

    /// Build a registry from explicit specifiers, bypassing cmdline
    /// discovery.
    pub fn from_specs<I, S>(specs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            events: specs.into_iter().map(Into::into).collect(),
        }
    }

    /// Event specifiers in input order.
    pub fn events(&self) -> &[String] {
        &self.events
    }

    /// Number of specifiers.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the boot command line requested no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Write `1` to every event's enable flag.
    pub fn enable(&self, tracefs: &MountPoint) -> Result<(), FsError> {
        self.set_enable(tracefs, true)
    }

    /// Write `0` to every event's enable flag.
    pub fn disable(&self, tracefs: &MountPoint) -> Result<(), FsError> {
        self.set_enable(tracefs, false)
    }

    /// Toggle each event in order. A mount failure aborts the batch
    /// since nothing downstream can work; a failed write for a single
    /// event is logged and skipped, since an event name unknown to
    /// this kernel should not block the rest.
    fn set_enable(&self, tracefs: &MountPoint, enable: bool) -> Result<(), FsError> {
        let flag = if enable { "1" } else { "0" };

        for spec in &self.events {
            let (subsystem, event) = match spec.rsplit_once(':') {
                Some(split) => split,
                None => (DEFAULT_SUBSYSTEM, spec.as_str()),
            };
            let path = format!("events/{subsystem}/{event}/enable");

            let current = match tracefs.read_file(&path) {
                Ok(raw) => raw,
                Err(e) if e.is_not_mounted() => {
                    // One-shot recovery: mount tracefs and retry the
                    // read. A second failure propagates.
                    if let Err(e) = tracefs.mount() {
                        if !e.is_already_mounted() {
                            return Err(e);
                        }
                    }
                    tracefs.read_file(&path)?
                }
                Err(e) => return Err(e),
            };

            if String::from_utf8_lossy(&current).trim() == flag {
                debug!("{event} already {flag}");
                continue;
            }

            if let Err(e) = tracefs.write_file(&path, flag, 0o666) {
                warn!("error toggling trace event {spec}: {e}");
            }
        }

        Ok(())
    }
}

impl<'a> IntoIterator for &'a TraceEvents {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}
