//! Diagnostic log stream.
//!
//! Entries are echoed to stderr and broadcast to any subscriber, so a
//! caller (or a test) can observe failures that are deliberately not
//! propagated, such as a dataset fetch degrading to an empty result.

use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl LogLevel {
    fn prefix(&self) -> &'static str {
        match self {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        }
    }
}

/// A single log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    /// Nesting depth for display
    #[serde(default)]
    pub indent: u8,
    /// Epoch milliseconds
    pub at: i64,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            at: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {}", "   ".repeat(self.indent as usize), self.level.prefix(), self.message)
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Fans log entries out to stderr and subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Emit an entry
    pub fn log(&self, entry: LogEntry) {
        eprintln!("{}", entry);

        // No receivers is fine
        let _ = self.sender.send(entry);
    }

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
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

pub fn log_success(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Success, msg));
}

pub fn log_warning(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Warning, msg));
}

pub fn log_error(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Error, msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg).with_indent(indent));
}

/// Drain whatever a receiver has buffered so far.
pub fn drain(receiver: &mut broadcast::Receiver<LogEntry>) -> Vec<LogEntry> {
    let mut entries = Vec::new();
    loop {
        match receiver.try_recv() {
            Ok(entry) => entries.push(entry),
            Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            Err(_) => break,
        }
    }
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_receives_entries() {
        let broadcaster = LogBroadcaster::new();
        let mut rx = broadcaster.subscribe();

        broadcaster.log(LogEntry::new(LogLevel::Warning, "sheet returned HTML").with_indent(1));
        broadcaster.log(LogEntry::new(LogLevel::Info, "loaded 3 records"));

        let entries = drain(&mut rx);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, LogLevel::Warning);
        assert_eq!(entries[0].indent, 1);
        assert_eq!(entries[1].message, "loaded 3 records");
    }

    #[test]
    fn test_log_without_subscribers_does_not_panic() {
        let broadcaster = LogBroadcaster::default();
        broadcaster.log(LogEntry::new(LogLevel::Error, "nobody listening"));
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_string(&LogEntry::new(LogLevel::Success, "sent")).unwrap();
        assert!(json.contains("\"level\":\"success\""));
        assert!(json.contains("\"at\":"));
    }

    #[test]
    fn test_display_indents() {
        let line = LogEntry::new(LogLevel::Success, "sent").with_indent(1).to_string();
        assert_eq!(line, "      ✓ sent");
    }
}
