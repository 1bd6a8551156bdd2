//! Run log: leveled entries forwarded to the `log` facade and kept in memory.
//!
//! The binary initializes `env_logger`, so entries show up on stderr according
//! to `RUST_LOG`. The in-memory history lets the CLI dump a JSON trace of a run
//! (`--log-json`).

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Log level of a run entry
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
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Optional indentation level (for nested logs)
    #[serde(default)]
    pub indent: u8,
}

impl LogEntry {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Info, message: message.into(), indent: 0 }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Success, message: message.into(), indent: 0 }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Warning, message: message.into(), indent: 0 }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: LogLevel::Error, message: message.into(), indent: 0 }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }
}

/// Global run log
pub static RUN_LOG: Lazy<RunLog> = Lazy::new(RunLog::new);

/// Collects entries for the current process and forwards them to `log`.
pub struct RunLog {
    history: Mutex<Vec<LogEntry>>,
}

impl RunLog {
    pub fn new() -> Self {
        Self {
            history: Mutex::new(Vec::new()),
        }
    }

    /// Record an entry and emit it through the `log` facade
    pub fn log(&self, entry: LogEntry) {
        let indent = "  ".repeat(entry.indent as usize);
        match entry.level {
            LogLevel::Info => log::info!("{}{}", indent, entry.message),
            LogLevel::Success => log::info!("{}ok: {}", indent, entry.message),
            LogLevel::Warning => log::warn!("{}{}", indent, entry.message),
            LogLevel::Error => log::error!("{}{}", indent, entry.message),
        }

        // A poisoned history only loses the trace, never the log line
        if let Ok(mut history) = self.history.lock() {
            history.push(entry);
        }
    }

    /// Snapshot of all entries recorded so far
    pub fn entries(&self) -> Vec<LogEntry> {
        self.history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default()
    }

    /// Remove and return all recorded entries
    pub fn drain(&self) -> Vec<LogEntry> {
        self.history
            .lock()
            .map(|mut h| std::mem::take(&mut *h))
            .unwrap_or_default()
    }
}

impl Default for RunLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenient logging functions
pub fn log_info(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::info(msg));
}

pub fn log_success(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::success(msg));
}

pub fn log_warning(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::warning(msg));
}

pub fn log_error(msg: impl Into<String>) {
    RUN_LOG.log(LogEntry::error(msg));
}

pub fn log_info_indent(msg: impl Into<String>, indent: u8) {
    RUN_LOG.log(LogEntry::info(msg).with_indent(indent));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_log_records_entries() {
        let log = RunLog::new();
        log.log(LogEntry::info("reading"));
        log.log(LogEntry::warning("short row").with_indent(1));

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].level, LogLevel::Warning);
        assert_eq!(entries[1].indent, 1);

        assert_eq!(log.drain().len(), 2);
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_entry_serialization() {
        let json = serde_json::to_value(LogEntry::success("done")).unwrap();
        assert_eq!(json["level"], "success");
        assert_eq!(json["message"], "done");
        assert_eq!(json["indent"], 0);
    }
}
