//! Run progress events.
//!
//! A run reports what it does as structured [`RunEvent`]s: the file it read,
//! each operation it started and the failures that operation produced, and
//! the final outcome. Events go through a [`RunLog`], which always forwards
//! them to a [`LogBroadcaster`] for subscribers and echoes them to stderr
//! unless the run is quiet.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

use crate::config::RunOptions;

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Success,
    Warning,
}

/// Something that happened during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RunEvent {
    #[serde(rename_all = "camelCase")]
    SchemaLoaded { operations: usize, fieldset_schemas: usize },

    #[serde(rename_all = "camelCase")]
    FileRead {
        file: String,
        encoding: String,
        delimiter: char,
        columns: usize,
        rows: usize,
    },

    /// Schema-independent structural checks ran.
    #[serde(rename_all = "camelCase")]
    BaselineChecked { failures: usize },

    /// `index` is 1-based.
    #[serde(rename_all = "camelCase")]
    OperationStarted {
        index: usize,
        total: usize,
        title: String,
        kind: String,
    },

    #[serde(rename_all = "camelCase")]
    OperationFinished {
        index: usize,
        title: String,
        failures: usize,
    },

    #[serde(rename_all = "camelCase")]
    RunFinished {
        file: String,
        passed: bool,
        failures: usize,
    },
}

impl RunEvent {
    pub fn level(&self) -> LogLevel {
        match self {
            RunEvent::SchemaLoaded { .. } | RunEvent::OperationStarted { .. } => LogLevel::Info,
            RunEvent::FileRead { .. } => LogLevel::Success,
            RunEvent::BaselineChecked { failures }
            | RunEvent::OperationFinished { failures, .. }
            | RunEvent::RunFinished { failures, .. } => {
                if *failures == 0 {
                    LogLevel::Success
                } else {
                    LogLevel::Warning
                }
            }
        }
    }

    /// Nesting depth for display
    fn indent(&self) -> usize {
        match self {
            RunEvent::OperationFinished { .. } => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for RunEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunEvent::SchemaLoaded {
                operations,
                fieldset_schemas,
            } => write!(
                f,
                "Schema loaded: {} operation(s), {} fieldset schema(s)",
                operations, fieldset_schemas
            ),
            RunEvent::FileRead {
                file,
                encoding,
                delimiter,
                columns,
                rows,
            } => {
                let delimiter = match delimiter {
                    '\t' => "\\t".to_string(),
                    c => c.to_string(),
                };
                write!(
                    f,
                    "Read {}: encoding {}, delimiter '{}', {} columns, {} rows",
                    file, encoding, delimiter, columns, rows
                )
            }
            RunEvent::BaselineChecked { failures: 0 } => f.write_str("Baseline checks passed"),
            RunEvent::BaselineChecked { failures } => {
                write!(f, "{} structural problem(s) in the file", failures)
            }
            RunEvent::OperationStarted {
                index,
                total,
                title,
                kind,
            } => write!(f, "[{}/{}] {} ({})", index, total, title, kind),
            RunEvent::OperationFinished { failures: 0, .. } => f.write_str("passed"),
            RunEvent::OperationFinished { title, failures, .. } => {
                write!(f, "{} failure(s) in '{}'", failures, title)
            }
            RunEvent::RunFinished { file, passed: true, .. } => write!(f, "{} passed", file),
            RunEvent::RunFinished { file, failures, .. } => {
                write!(f, "{} failed with {} failure(s)", file, failures)
            }
        }
    }
}

/// A single log entry as sent to subscribers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub event: RunEvent,
}

impl From<RunEvent> for LogEntry {
    fn from(event: RunEvent) -> Self {
        Self {
            level: event.level(),
            message: event.to_string(),
            event,
        }
    }
}

/// Global log broadcaster
pub static LOG_BROADCASTER: Lazy<LogBroadcaster> = Lazy::new(LogBroadcaster::new);

/// Broadcasts log entries to all subscribers
pub struct LogBroadcaster {
    sender: broadcast::Sender<LogEntry>,
}

impl LogBroadcaster {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(256);
        Self { sender }
    }

    /// Send a log entry to all subscribers
    pub fn send(&self, entry: LogEntry) {
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

/// Event sink for one run.
#[derive(Clone, Copy)]
pub struct RunLog<'a> {
    broadcaster: &'a LogBroadcaster,
    echo: bool,
}

impl<'a> RunLog<'a> {
    /// Echo to stderr unless `options.quiet`.
    pub fn new(broadcaster: &'a LogBroadcaster, options: &RunOptions) -> Self {
        Self {
            broadcaster,
            echo: !options.quiet,
        }
    }

    /// Broadcast only, never echo.
    pub fn silent(broadcaster: &'a LogBroadcaster) -> Self {
        Self {
            broadcaster,
            echo: false,
        }
    }

    pub fn echoes(&self) -> bool {
        self.echo
    }

    pub fn emit(&self, event: RunEvent) {
        let entry = LogEntry::from(event);

        if self.echo {
            let prefix = match entry.level {
                LogLevel::Info => "   ",
                LogLevel::Success => "   ✓",
                LogLevel::Warning => "   !",
            };
            let indent = "   ".repeat(entry.event.indent());
            eprintln!("{}{} {}", indent, prefix, entry.message);
        }

        self.broadcaster.send(entry);
    }
}

impl RunLog<'static> {
    /// Sink on the global broadcaster.
    pub fn global(options: &RunOptions) -> Self {
        Self::new(&LOG_BROADCASTER, options)
    }
}
