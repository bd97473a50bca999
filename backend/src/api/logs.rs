//! Pipeline logs, mirrored to stderr and streamed over Server-Sent Events.
//!
//! Loading and view rendering report progress through [`log_info`] and
//! friends. Each entry is printed and broadcast to every `/api/logs`
//! subscriber; entries sent while nobody listens are dropped.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level for frontend display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// RFC 3339 timestamp
    pub at: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all connected SSE clients
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Print an entry and send it to all subscribers
    pub fn log(&self, entry: LogEntry) {
        // stderr, so JSON on stdout stays clean
        let prefix = match entry.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        eprintln!("{} {}", prefix, entry.message);

        let _ = self.sender.send(entry);
    }

    /// Get a receiver for SSE streaming
    pub fn subscribe(&self) -> broadcast::Receiver<LogEntry> {
        self.sender.subscribe()
    }
}

impl Default for LogBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::error(msg));
}
