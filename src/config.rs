//! Configuration types.

use crate::error::ConfigError;

/// Prefix shared by every collector environment variable.
const ENV_PREFIX: &str = "NOTIFICATION_COLLECTOR_";

/// Collector configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Whether the collector registers its listeners at all.
    pub enabled: bool,
    /// Whether the mail path looks up the mailable on the captured call stack.
    pub collect_mailables: bool,
    /// Nesting depth after which serialized values are cut off.
    pub max_depth: usize,
    /// Maximum number of frames kept in a record's trace.
    pub max_trace_frames: usize,
    /// Object keys whose values are redacted from record data.
    pub redact_keys: Vec<String>,
    /// Frames whose file starts with one of these prefixes are left out of traces.
    pub skip_paths: Vec<String>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            collect_mailables: true,
            max_depth: 10,
            max_trace_frames: 50,
            redact_keys: ["password", "secret", "token", "api_key"]
                .into_iter()
                .map(String::from)
                .collect(),
            skip_paths: Vec::new(),
        }
    }
}

impl CollectorConfig {
    /// Build config from `NOTIFICATION_COLLECTOR_*` environment variables.
    ///
    /// Unset variables keep their defaults; set but unparseable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(format!("{ENV_PREFIX}{key}")).ok())
    }

    /// Build config from an arbitrary key lookup (keys without the env prefix).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let enabled = match lookup("ENABLED") {
            Some(v) => parse_bool("ENABLED", &v)?,
            None => defaults.enabled,
        };
        let collect_mailables = match lookup("COLLECT_MAILABLES") {
            Some(v) => parse_bool("COLLECT_MAILABLES", &v)?,
            None => defaults.collect_mailables,
        };
        let max_depth = match lookup("MAX_DEPTH") {
            Some(v) => parse_usize("MAX_DEPTH", &v)?,
            None => defaults.max_depth,
        };
        let max_trace_frames = match lookup("MAX_TRACE_FRAMES") {
            Some(v) => parse_usize("MAX_TRACE_FRAMES", &v)?,
            None => defaults.max_trace_frames,
        };
        let redact_keys = lookup("REDACT_KEYS")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.redact_keys);
        let skip_paths = lookup("SKIP_PATHS")
            .map(|v| split_list(&v))
            .unwrap_or(defaults.skip_paths);

        Ok(Self {
            enabled,
            collect_mailables,
            max_depth,
            max_trace_frames,
            redact_keys,
            skip_paths,
        })
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidValue {
            key: format!("{ENV_PREFIX}{key}"),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}

fn parse_usize(key: &str, value: &str) -> Result<usize, ConfigError> {
    value
        .trim()
        .parse::<usize>()
        .map_err(|e| ConfigError::InvalidValue {
            key: format!("{ENV_PREFIX}{key}"),
            message: format!("{e}"),
        })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        let config = CollectorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, CollectorConfig::default());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = CollectorConfig::from_lookup(lookup(&[
            ("ENABLED", "off"),
            ("MAX_DEPTH", "3"),
            ("REDACT_KEYS", "pin, ssn ,"),
            ("SKIP_PATHS", "/usr/src"),
        ]))
        .unwrap();

        assert!(!config.enabled);
        assert!(config.collect_mailables);
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.redact_keys, vec!["pin", "ssn"]);
        assert_eq!(config.skip_paths, vec!["/usr/src"]);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = CollectorConfig::from_lookup(lookup(&[("MAX_TRACE_FRAMES", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("NOTIFICATION_COLLECTOR_MAX_TRACE_FRAMES"));

        assert!(CollectorConfig::from_lookup(lookup(&[("ENABLED", "maybe")])).is_err());
    }
}
