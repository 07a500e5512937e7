//! Value normalization for record data and traces.
//!
//! Everything that ends up in a record's `data` map goes through a
//! [`Serializer`] first: the collector only stores JSON-safe, redacted,
//! depth-limited values.

use regex::Regex;
use serde_json::{Map, Value, json};
use tracing::warn;

use super::StackFrame;
use crate::config::CollectorConfig;
use crate::error::ConfigError;
use crate::record::TraceEntry;

/// Replacement for values under a redacted key.
pub const REDACTED: &str = "*removed*";

/// Replacement for containers nested deeper than the configured limit.
pub const MAX_DEPTH_MARKER: &str = "[max depth reached]";

/// Key of the marker object left where a value failed to serialize.
pub const ERROR_KEY: &str = "__error";

/// Normalizes arbitrary values into their displayable form.
pub trait Serializer: Send + Sync {
    /// JSON-safe representation of `value`.
    fn normalize(&self, value: Value) -> Value;

    /// Apply [`Serializer::normalize`] to every value of a map.
    fn normalize_each(&self, values: Map<String, Value>) -> Map<String, Value> {
        values
            .into_iter()
            .map(|(key, value)| (key, self.normalize(value)))
            .collect()
    }

    /// Display summaries of a raw trace.
    fn shorten_trace(&self, trace: &[StackFrame]) -> Vec<TraceEntry>;
}

/// Unwrap a value conversion, leaving an error marker in place of a failure.
pub fn snapshot(result: serde_json::Result<Value>) -> Value {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Value could not be serialized for the record");
            json!({ ERROR_KEY: e.to_string() })
        }
    }
}

/// Default [`Serializer`]: key redaction, depth limit and trace trimming.
#[derive(Debug, Clone)]
pub struct JsonSerializer {
    max_depth: usize,
    max_frames: usize,
    redact: Option<Regex>,
    skip_paths: Vec<String>,
}

impl JsonSerializer {
    /// Build a serializer from collector configuration.
    pub fn new(config: &CollectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            max_depth: config.max_depth,
            max_frames: config.max_trace_frames,
            redact: redaction_pattern(&config.redact_keys)?,
            skip_paths: config.skip_paths.clone(),
        })
    }

    fn normalize_entry(&self, key: &str, value: Value, depth: usize) -> Value {
        if self.is_redacted(key) {
            Value::String(REDACTED.to_string())
        } else {
            self.normalize_at(value, depth)
        }
    }

    fn normalize_at(&self, value: Value, depth: usize) -> Value {
        match value {
            Value::Array(_) | Value::Object(_) if depth >= self.max_depth => {
                Value::String(MAX_DEPTH_MARKER.to_string())
            }
            Value::Array(items) => Value::Array(
                items
                    .into_iter()
                    .map(|item| self.normalize_at(item, depth + 1))
                    .collect(),
            ),
            Value::Object(fields) => Value::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| {
                        let value = self.normalize_entry(&key, value, depth + 1);
                        (key, value)
                    })
                    .collect(),
            ),
            scalar => scalar,
        }
    }

    fn is_redacted(&self, key: &str) -> bool {
        self.redact.as_ref().is_some_and(|re| re.is_match(key))
    }

    fn is_skipped(&self, frame: &StackFrame) -> bool {
        frame.file.as_deref().is_some_and(|file| {
            self.skip_paths
                .iter()
                .any(|prefix| file.starts_with(prefix.as_str()))
        })
    }
}

impl Default for JsonSerializer {
    fn default() -> Self {
        let config = CollectorConfig::default();
        Self {
            max_depth: config.max_depth,
            max_frames: config.max_trace_frames,
            redact: redaction_pattern(&config.redact_keys).ok().flatten(),
            skip_paths: config.skip_paths,
        }
    }
}

impl Serializer for JsonSerializer {
    fn normalize(&self, value: Value) -> Value {
        self.normalize_at(value, 0)
    }

    /// Map keys are redacted like nested object keys.
    fn normalize_each(&self, values: Map<String, Value>) -> Map<String, Value> {
        values
            .into_iter()
            .map(|(key, value)| {
                let value = self.normalize_entry(&key, value, 0);
                (key, value)
            })
            .collect()
    }

    fn shorten_trace(&self, trace: &[StackFrame]) -> Vec<TraceEntry> {
        trace
            .iter()
            .filter(|frame| !self.is_skipped(frame))
            .take(self.max_frames)
            .map(|frame| TraceEntry {
                file: frame.file.clone(),
                line: frame.line,
                function: frame.function.clone(),
            })
            .collect()
    }
}

/// Case-insensitive pattern matching any key that contains one of `keys`.
fn redaction_pattern(keys: &[String]) -> Result<Option<Regex>, ConfigError> {
    if keys.is_empty() {
        return Ok(None);
    }
    let alternatives = keys
        .iter()
        .map(|key| regex::escape(key))
        .collect::<Vec<_>>()
        .join("|");
    Ok(Some(Regex::new(&format!("(?i)(?:{alternatives})"))?))
}
