//! Bounded in-memory log of recent failures.
//!
//! # Design
//! Entries live in a `VecDeque` behind a `Mutex`; when a push takes the
//! buffer over capacity the oldest entries are evicted. Nothing is persisted.
//! A `CrashSink` can be attached to forward entries elsewhere (a monitoring
//! service, a file); sink failures are logged and dropped so recording a
//! crash can never fail the caller.

use std::collections::VecDeque;
use std::error::Error;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_CRASH_LOG_CAPACITY;

pub type BoxError = Box<dyn Error + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrashLogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub platform: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Caller-supplied context merged into an entry.
#[derive(Debug, Clone, Default)]
pub struct CrashFields {
    pub user_id: Option<String>,
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CrashFields {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Destination for entries beyond the in-memory buffer.
pub trait CrashSink: Send + Sync {
    fn forward(&self, entry: &CrashLogEntry) -> Result<(), BoxError>;
}

pub struct CrashLogger {
    capacity: usize,
    entries: Mutex<VecDeque<CrashLogEntry>>,
    sink: Option<Box<dyn CrashSink>>,
}

impl std::fmt::Debug for CrashLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrashLogger")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}

impl Default for CrashLogger {
    fn default() -> Self {
        Self::new(DEFAULT_CRASH_LOG_CAPACITY)
    }
}

impl CrashLogger {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
            sink: None,
        }
    }

    pub fn with_sink(mut self, sink: Box<dyn CrashSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record an error. Its `source()` chain becomes the stack text.
    pub fn log(&self, error: &(dyn Error + 'static), action: &str, fields: Option<CrashFields>) {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        let stack = (!chain.is_empty()).then(|| chain.join("\n"));
        self.push(error.to_string(), stack, action, fields);
    }

    /// Record a failure that is not an `Error` value (a panic payload, a
    /// message from the host).
    pub fn log_message(&self, message: &str, action: &str, fields: Option<CrashFields>) {
        self.push(message.to_string(), None, action, fields);
    }

    fn push(&self, message: String, stack: Option<String>, action: &str, fields: Option<CrashFields>) {
        let fields = fields.unwrap_or_default();
        let entry = CrashLogEntry {
            timestamp: Utc::now(),
            message,
            stack,
            platform: std::env::consts::OS.to_string(),
            action: action.to_string(),
            user_id: fields.user_id,
            extra: fields.extra,
        };
        tracing::error!(action = %entry.action, message = %entry.message, "crash logged");

        {
            let mut entries = self.lock();
            entries.push_back(entry.clone());
            while entries.len() > self.capacity {
                entries.pop_front();
            }
        }

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.forward(&entry) {
                tracing::warn!(error = %e, "crash sink rejected entry");
            }
        }
    }

    /// Snapshot of the buffer, oldest first.
    pub fn get_logs(&self) -> Vec<CrashLogEntry> {
        self.lock().iter().cloned().collect()
    }

    pub fn clear_logs(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<CrashLogEntry>> {
        // A panic while holding the lock leaves the deque intact.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
