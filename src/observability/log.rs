//! Structured command logging
//!
//! Line-oriented JSON, written synchronously with no buffering:
//! one log line = one event, fields in deterministic order, explicit
//! severity levels. Storage commands are logged at `Trace` with their
//! elapsed time, so a verbose log reads as a command trace of the
//! connection.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Per-command detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Recoverable issues
    Warn = 2,
    /// Operation failures
    Error = 3,
}

impl Severity {
    /// String form used in log lines
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A command logger with a severity threshold.
///
/// The default threshold (`Warn`) keeps the command trace quiet; a
/// `verbose` logger emits one line per storage command.
#[derive(Debug, Clone)]
pub struct CommandLog {
    threshold: Severity,
}

impl CommandLog {
    /// Create a logger emitting events at or above `threshold`
    pub fn new(threshold: Severity) -> Self {
        Self { threshold }
    }

    /// A logger that traces every storage command
    pub fn verbose() -> Self {
        Self::new(Severity::Trace)
    }

    /// Log one storage command with its elapsed time
    pub fn command(&self, command: &str, target: &str, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis().to_string();
        self.emit(
            Severity::Trace,
            "storage.command",
            &[
                ("cmd", command),
                ("target", target),
                ("elapsed_ms", &elapsed_ms),
            ],
        );
    }

    /// Log an operation failure
    pub fn failure(&self, operation: &str, message: &str) {
        self.emit(
            Severity::Error,
            "storage.failure",
            &[("op", operation), ("message", message)],
        );
    }

    /// Emit one event line; fields are sorted for deterministic output
    fn emit(&self, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        if severity < self.threshold {
            return;
        }

        let mut line = String::with_capacity(128);
        line.push_str("{\"event\":\"");
        escape_into(&mut line, event);
        line.push_str("\",\"severity\":\"");
        line.push_str(severity.as_str());
        line.push('"');

        let mut sorted: Vec<_> = fields.iter().collect();
        sorted.sort_by_key(|(key, _)| *key);
        for (key, value) in sorted {
            line.push_str(",\"");
            escape_into(&mut line, key);
            line.push_str("\":\"");
            escape_into(&mut line, value);
            line.push('"');
        }

        line.push_str("}\n");

        // One write_all per line keeps events whole under concurrency.
        let mut out = io::stdout();
        let _ = out.write_all(line.as_bytes());
        let _ = out.flush();
    }
}

impl Default for CommandLog {
    fn default() -> Self {
        Self::new(Severity::Warn)
    }
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
}
