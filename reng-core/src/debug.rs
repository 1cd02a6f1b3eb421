//! Category-based debug logging in front of `tracing`
//!
//! The sink is fixed when the service is built (from the page configuration),
//! replacing the original design's mutable process-wide logger factory.

use std::rc::Rc;

use serde_json::{Map, Value};

/// Custom sink: receives `(category, message)` pairs.
pub type DebugSink = Rc<dyn Fn(&str, &str)>;

/// The page's debug logging service.
pub struct DebugLog {
    sink: Option<DebugSink>,
}

impl DebugLog {
    /// Create the service. Without a custom sink, entries go to the
    /// `tracing` debug level.
    pub fn new(sink: Option<DebugSink>) -> Self {
        Self { sink }
    }

    /// Create a logger pinned to one category.
    pub fn logger(&self, category: impl Into<String>) -> DebugLogger {
        DebugLogger {
            category: category.into(),
            sink: self.sink.clone(),
        }
    }

    /// Log a message under a category.
    pub fn log(&self, category: &str, message: &str) {
        emit(&self.sink, category, message);
    }

    /// Log a titled message under a category.
    pub fn log_titled(&self, category: &str, title: &str, text: &str) {
        emit(&self.sink, category, &format!("{title}: {text}"));
    }

    /// Log every entry of a key/value map, one line per key.
    pub fn log_fields(&self, category: &str, fields: &Map<String, Value>) {
        for (key, value) in fields {
            emit(&self.sink, category, &format!("{key}: {value}"));
        }
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new(None)
    }
}

/// A logger bound to one category, handed out by [`DebugLog::logger`].
pub struct DebugLogger {
    category: String,
    sink: Option<DebugSink>,
}

impl DebugLogger {
    /// Log a message under this logger's category.
    pub fn log(&self, message: &str) {
        emit(&self.sink, &self.category, message);
    }
}

fn emit(sink: &Option<DebugSink>, category: &str, message: &str) {
    match sink {
        Some(sink) => sink(category, message),
        None => tracing::debug!(category = %category, "{message}"),
    }
}
