//! Context-aware logger
//!
//! [`Logger`] reads the metadata mapping out of whatever [`Context`] it is
//! handed and attaches it to each entry. Entries are handed to a [`LogSink`];
//! the default [`TracingSink`] forwards them to `tracing`.
//!
//! No operation here returns an error or panics. Logging must never change the
//! control flow of the code doing the logging.

use std::fmt;
use std::sync::{Arc, Mutex};

use axum::http::Request;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::context_data::{self, Carrier, ContextData};
use super::fields::RequestFields;
use super::format::{display_lossy, sprintf};
use crate::context::Context;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single emitted entry.
///
/// Context-derived fields and caller-supplied structured fields are kept in
/// separate sections so neither can overwrite the other.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: Level,
    pub label: Arc<str>,
    pub context: Arc<ContextData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
    pub message: String,
}

impl LogEntry {
    /// JSON rendering of the entry, falling back to the plain text form.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| display_lossy(self))
    }

    /// JSON rendering of the context section alone.
    pub fn context_json(&self) -> String {
        serde_json::to_string(&*self.context).unwrap_or_else(|_| format!("{:?}", self.context))
    }

    /// JSON rendering of the structured section alone, `{}` when absent.
    pub fn data_json(&self) -> String {
        match &self.data {
            Some(data) => serde_json::to_string(data).unwrap_or_else(|_| format!("{:?}", data)),
            None => "{}".to_string(),
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.label, self.level, self.message)?;
        for (key, value) in self.context.iter() {
            write!(f, " {}={}", key, value)?;
        }
        if let Some(data) = &self.data {
            for (key, value) in data {
                write!(f, " data.{}={}", key, value)?;
            }
        }
        Ok(())
    }
}

/// Destination of log entries.
pub trait LogSink: Send + Sync {
    /// Whether entries at `level` would be recorded at all.
    ///
    /// Checked before an entry is built so disabled levels cost a branch.
    fn enabled(&self, _level: Level) -> bool {
        true
    }

    fn emit(&self, entry: &LogEntry);
}

/// Forwards entries to the active `tracing` subscriber.
///
/// Each entry becomes one event with a `label` field and the message. The
/// context and structured sections are recorded as the `context` and `data`
/// fields, each holding the section encoded as a JSON string, so a JSON
/// subscriber shows them as escaped strings rather than nested objects.
///
/// Every event is emitted with the target `ctxlog::logging::logger`
/// regardless of the logger's label. Per-target filters therefore select
/// all ctxlog output at once (`ctxlog::logging=debug`); filtering by label
/// has to happen on the `label` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn enabled(&self, level: Level) -> bool {
        match level {
            Level::Debug => tracing::enabled!(tracing::Level::DEBUG),
            Level::Info => tracing::enabled!(tracing::Level::INFO),
            Level::Warn => tracing::enabled!(tracing::Level::WARN),
            Level::Error => tracing::enabled!(tracing::Level::ERROR),
        }
    }

    fn emit(&self, entry: &LogEntry) {
        let label = &*entry.label;
        let context = entry.context_json();
        let data = entry.data_json();
        let message = &entry.message;

        match entry.level {
            Level::Debug => tracing::debug!(label, %context, %data, "{}", message),
            Level::Info => tracing::info!(label, %context, %data, "{}", message),
            Level::Warn => tracing::warn!(label, %context, %data, "{}", message),
            Level::Error => tracing::error!(label, %context, %data, "{}", message),
        }
    }
}

/// Keeps entries in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<LogEntry>> {
        // A panic elsewhere while holding the lock leaves the Vec intact.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl LogSink for MemorySink {
    fn emit(&self, entry: &LogEntry) {
        self.lock().push(entry.clone());
    }
}

/// Structured logger tagging every entry with a fixed label.
///
/// Stateless after construction, cheap to clone and safe to share between
/// threads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use ctxlog::logging::{Logger, MemorySink};
///
/// let sink = Arc::new(MemorySink::new());
/// let logger = Logger::with_sink("checkout", sink.clone());
///
/// let ctx = logger.build_context_data_and_set_value("req-1");
/// logger.infof(&ctx, "charged %d cents", &[&1250]);
///
/// let entry = &sink.entries()[0];
/// assert_eq!(&*entry.label, "checkout");
/// assert_eq!(entry.message, "charged 1250 cents");
/// assert_eq!(entry.context["id"], "req-1");
/// ```
#[derive(Clone)]
pub struct Logger {
    label: Arc<str>,
    sink: Arc<dyn LogSink>,
}

impl Logger {
    /// Create a logger emitting through `tracing`.
    pub fn new(label: impl Into<String>) -> Self {
        Self::with_sink(label, Arc::new(TracingSink))
    }

    /// Create a logger emitting into `sink`.
    pub fn with_sink(label: impl Into<String>, sink: Arc<dyn LogSink>) -> Self {
        Self {
            label: Arc::from(label.into()),
            sink,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Start a fresh context carrying only `request_id`.
    pub fn build_context_data_and_set_value(&self, request_id: impl Into<String>) -> Context {
        context_data::build_context_data_and_set_value(&Context::background(), request_id)
    }

    /// Merge `extra_data` and `request_id` into the carrier's context.
    ///
    /// See [`context_data::set_context_data_and_set_value`].
    pub fn set_context_data_and_set_value<C, I, K, V>(
        &self,
        carrier: C,
        extra_data: I,
        request_id: impl Into<String>,
    ) -> C
    where
        C: Carrier,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        context_data::set_context_data_and_set_value(carrier, extra_data, request_id)
    }

    pub fn log(&self, level: Level, ctx: &Context, message: impl fmt::Display) {
        if self.sink.enabled(level) {
            self.emit(level, ctx, None, display_lossy(message));
        }
    }

    pub fn logf(&self, level: Level, ctx: &Context, format: &str, args: &[&dyn fmt::Display]) {
        if self.sink.enabled(level) {
            self.emit(level, ctx, None, sprintf(format, args));
        }
    }

    pub fn log_map(
        &self,
        level: Level,
        ctx: &Context,
        fields: &Map<String, Value>,
        message: impl fmt::Display,
    ) {
        if self.sink.enabled(level) {
            self.emit(level, ctx, Some(fields.clone()), display_lossy(message));
        }
    }

    pub fn info(&self, ctx: &Context, message: impl fmt::Display) {
        self.log(Level::Info, ctx, message);
    }

    pub fn infof(&self, ctx: &Context, format: &str, args: &[&dyn fmt::Display]) {
        self.logf(Level::Info, ctx, format, args);
    }

    /// Log `message` with `fields` in the structured section of the entry.
    pub fn info_map(&self, ctx: &Context, fields: &Map<String, Value>, message: impl fmt::Display) {
        self.log_map(Level::Info, ctx, fields, message);
    }

    pub fn debug(&self, ctx: &Context, message: impl fmt::Display) {
        self.log(Level::Debug, ctx, message);
    }

    pub fn debugf(&self, ctx: &Context, format: &str, args: &[&dyn fmt::Display]) {
        self.logf(Level::Debug, ctx, format, args);
    }

    pub fn warn(&self, ctx: &Context, message: impl fmt::Display) {
        self.log(Level::Warn, ctx, message);
    }

    pub fn warnf(&self, ctx: &Context, format: &str, args: &[&dyn fmt::Display]) {
        self.logf(Level::Warn, ctx, format, args);
    }

    pub fn error(&self, ctx: &Context, message: impl fmt::Display) {
        self.log(Level::Error, ctx, message);
    }

    pub fn errorf(&self, ctx: &Context, format: &str, args: &[&dyn fmt::Display]) {
        self.logf(Level::Error, ctx, format, args);
    }

    /// Log the standard fields of an inbound request.
    pub fn log_request<B>(&self, ctx: &Context, request: &Request<B>) {
        if self.sink.enabled(Level::Info) {
            let fields = RequestFields::from_request(request).into_map();
            self.emit(Level::Info, ctx, Some(fields), "incoming request".to_string());
        }
    }

    fn emit(&self, level: Level, ctx: &Context, data: Option<Map<String, Value>>, message: String) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            level,
            label: Arc::clone(&self.label),
            context: context_data::context_data(ctx).unwrap_or_default(),
            data,
            message,
        };
        self.sink.emit(&entry);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("label", &self.label).finish()
    }
}
