//! Pipeline log streaming via Server-Sent Events (SSE).
//!
//! Every entry is printed to stdout and broadcast to subscribers of
//! `/api/logs`. Entries written through a [`RequestLog`] carry the id of the
//! request that produced them, so concurrent runs can be told apart.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Buffered entries per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 256;

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
    /// Nesting level for display
    #[serde(default)]
    pub indent: u8,
    /// Id of the lookup request, if the entry belongs to one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            indent: 0,
            request_id: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_indent(mut self, indent: u8) -> Self {
        self.indent = indent;
        self
    }

    pub fn with_request(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Fans log entries out to all connected SSE clients
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Print `entry` and send it to every subscriber.
    pub fn log(&self, entry: LogEntry) {
        let prefix = match entry.level {
            LogLevel::Info => "   ",
            LogLevel::Success => "   ✓",
            LogLevel::Warning => "   ⚠️",
            LogLevel::Error => "   ❌",
        };
        let indent = "   ".repeat(entry.indent as usize);
        match &entry.request_id {
            Some(id) => println!("{}{} [{}] {}", indent, prefix, id, entry.message),
            None => println!("{}{} {}", indent, prefix, entry.message),
        }

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

/// Logger bound to one lookup request.
#[derive(Debug, Clone)]
pub struct RequestLog {
    id: String,
}

impl RequestLog {
    /// Start a request with a fresh short id.
    pub fn new() -> Self {
        let id = Uuid::new_v4().simple().to_string();
        Self {
            id: id[..8].to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn emit(&self, level: LogLevel, msg: impl Into<String>, indent: u8) {
        LOG_BROADCASTER.log(
            LogEntry::new(level, msg)
                .with_indent(indent)
                .with_request(self.id.clone()),
        );
    }

    pub fn info(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Info, msg, 0);
    }

    pub fn info_indent(&self, msg: impl Into<String>, indent: u8) {
        self.emit(LogLevel::Info, msg, indent);
    }

    pub fn success(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Success, msg, 0);
    }

    pub fn warning(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Warning, msg, 0);
    }

    pub fn warning_indent(&self, msg: impl Into<String>, indent: u8) {
        self.emit(LogLevel::Warning, msg, indent);
    }

    pub fn error(&self, msg: impl Into<String>) {
        self.emit(LogLevel::Error, msg, 0);
    }
}

impl Default for RequestLog {
    fn default() -> Self {
        Self::new()
    }
}

/// Log an entry outside any request (uploads, server lifecycle).
pub fn log_info(msg: impl Into<String>) {
    LOG_BROADCASTER.log(LogEntry::new(LogLevel::Info, msg));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_entries_carry_id() {
        let mut rx = LOG_BROADCASTER.subscribe();
        let log = RequestLog::new();
        assert_eq!(log.id().len(), 8);

        log.warning("two columns missing");

        // Other tests may log concurrently; find ours.
        loop {
            let entry = rx.try_recv().unwrap();
            if entry.request_id.as_deref() == Some(log.id()) {
                assert_eq!(entry.level, LogLevel::Warning);
                assert_eq!(entry.message, "two columns missing");
                break;
            }
        }
    }

    #[test]
    fn test_log_info_has_no_request() {
        let mut rx = LOG_BROADCASTER.subscribe();
        log_info("upload received: people.csv");

        loop {
            let entry = rx.try_recv().unwrap();
            if entry.message == "upload received: people.csv" {
                assert_eq!(entry.level, LogLevel::Info);
                assert!(entry.request_id.is_none());
                break;
            }
        }
    }

    #[test]
    fn test_entry_serialization() {
        let entry = LogEntry::new(LogLevel::Success, "done").with_indent(1);
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["level"], "success");
        assert_eq!(json["indent"], 1);
        assert!(json.get("requestId").is_none());
    }
}
