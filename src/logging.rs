//! Injected logging capability.
//!
//! Components never reach for a global logger. Each renderer and the
//! generator receive an `Arc<dyn Logger>` at construction, and the host
//! process decides what sits behind it:
//!
//! - [`RingBufferLogger`]: bounded in-memory buffer (oldest entries evicted
//!   first), optionally forwarding every accepted entry to `tracing`.
//! - [`NullLogger`]: discards everything; handy for tests and library users
//!   who don't care.
//!
//! The CLI installs a `tracing-subscriber` fmt layer via [`init_tracing`]
//! and hands a `RingBufferLogger` to the generator. At teardown the buffer
//! can be drained and written next to the output for debugging.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;
use strum::{Display, EnumString};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    /// Component that produced the entry, e.g. `render.cta` or `generate`.
    pub target: String,
    pub message: String,
}

/// Observability sink injected into every component.
pub trait Logger: Send + Sync {
    fn log(&self, level: LogLevel, target: &str, message: &str);

    fn debug(&self, target: &str, message: &str) {
        self.log(LogLevel::Debug, target, message);
    }

    fn info(&self, target: &str, message: &str) {
        self.log(LogLevel::Info, target, message);
    }

    fn warn(&self, target: &str, message: &str) {
        self.log(LogLevel::Warn, target, message);
    }

    fn error(&self, target: &str, message: &str) {
        self.log(LogLevel::Error, target, message);
    }

    /// Entries still held by the sink, oldest first. Sinks that keep
    /// nothing return an empty list.
    fn snapshot(&self) -> Vec<LogEntry> {
        Vec::new()
    }
}

/// Logger that drops every entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: LogLevel, _target: &str, _message: &str) {}
}

/// Bounded in-memory log.
///
/// Append and eviction happen under one lock, so concurrent renderers on
/// the rayon pool never observe a buffer above capacity.
#[derive(Debug)]
pub struct RingBufferLogger {
    capacity: usize,
    min_level: LogLevel,
    forward_to_tracing: bool,
    entries: Mutex<VecDeque<LogEntry>>,
}

impl RingBufferLogger {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize, min_level: LogLevel) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            min_level,
            forward_to_tracing: false,
            entries: Mutex::new(VecDeque::with_capacity(capacity.min(1024))),
        }
    }

    /// Also emit accepted entries as `tracing` events.
    pub fn with_tracing(mut self, forward: bool) -> Self {
        self.forward_to_tracing = forward;
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Snapshot of the buffered entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().iter().cloned().collect()
    }

    /// Remove and return all buffered entries, oldest first.
    pub fn drain(&self) -> Vec<LogEntry> {
        self.lock().drain(..).collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<LogEntry>> {
        // A panic while holding the lock can't leave the deque half-updated,
        // so a poisoned buffer is still usable.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Logger for RingBufferLogger {
    fn log(&self, level: LogLevel, target: &str, message: &str) {
        if level < self.min_level {
            return;
        }
        if self.forward_to_tracing {
            emit_tracing(level, target, message);
        }
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            target: target.to_string(),
            message: message.to_string(),
        };
        let mut entries = self.lock();
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    fn snapshot(&self) -> Vec<LogEntry> {
        self.entries()
    }
}

fn emit_tracing(level: LogLevel, target: &str, message: &str) {
    match level {
        LogLevel::Debug => tracing::debug!(component = target, "{message}"),
        LogLevel::Info => tracing::info!(component = target, "{message}"),
        LogLevel::Warn => tracing::warn!(component = target, "{message}"),
        LogLevel::Error => tracing::error!(component = target, "{message}"),
    }
}

/// Install the process-wide `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` over `info`.
/// Calling this twice is harmless (the second install is ignored).
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default_directive = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
