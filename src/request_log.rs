//! Structured request log entries and the sinks that receive them.
//!
//! Each forwarded request produces a "Forwarding" entry and exactly one
//! terminal entry ("completed" or "failed"), all sharing the request's
//! correlation ID. Entries are handed to a [`LogSink`]; production uses
//! [`StdoutSink`] (one JSON object per line), tests use [`MemorySink`].

use std::io::Write;
use std::sync::Mutex;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::correlation::CorrelationId;

pub const SERVICE_NAME: &str = "tailspin-toystore-middleware";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
    Warn,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub timestamp: String,
    pub level: Level,
    pub message: String,
    pub correlation_id: String,
    pub service: &'static str,
    pub environment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

impl LogEntry {
    pub fn new(
        level: Level,
        message: impl Into<String>,
        correlation_id: &CorrelationId,
        environment: &str,
    ) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            level,
            message: message.into(),
            correlation_id: correlation_id.as_str().to_string(),
            service: SERVICE_NAME,
            environment: environment.to_string(),
            method: None,
            path: None,
            target_url: None,
            status_code: None,
            duration_ms: None,
            error_type: None,
        }
    }

    #[must_use]
    pub fn request(mut self, method: &str, path: &str) -> Self {
        self.method = Some(method.to_string());
        self.path = Some(path.to_string());
        self
    }

    #[must_use]
    pub fn target_url(mut self, url: &str) -> Self {
        self.target_url = Some(url.to_string());
        self
    }

    #[must_use]
    pub const fn status_code(mut self, status: u16) -> Self {
        self.status_code = Some(status);
        self
    }

    #[must_use]
    pub const fn duration_ms(mut self, ms: u64) -> Self {
        self.duration_ms = Some(ms);
        self
    }

    #[must_use]
    pub fn error_type(mut self, kind: &str) -> Self {
        self.error_type = Some(kind.to_string());
        self
    }
}

pub trait LogSink: Send + Sync {
    fn emit(&self, entry: LogEntry);
}

/// Writes each entry as a single JSON line on standard output.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl LogSink for StdoutSink {
    fn emit(&self, entry: LogEntry) {
        match serde_json::to_string(&entry) {
            Ok(mut line) => {
                line.push('\n');
                let mut out = std::io::stdout().lock();
                if let Err(e) = out.write_all(line.as_bytes()).and_then(|()| out.flush()) {
                    tracing::warn!(error = %e, "failed to write request log entry");
                }
            }
            Err(e) => tracing::warn!(error = %e, "failed to serialize request log entry"),
        }
    }
}

/// Keeps entries in memory so callers can inspect them.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    #[must_use]
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    #[must_use]
    pub fn for_correlation_id(&self, id: &str) -> Vec<LogEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.correlation_id == id)
            .collect()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, entry: LogEntry) {
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}
