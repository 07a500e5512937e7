//! Error types for the notification collector.

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Invalid redaction pattern: {0}")]
    Pattern(#[from] regex::Error),
}

/// Errors raised while turning a send event into a record.
///
/// These never reach the dispatcher: the event handlers log and drop them.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Sent message could not be parsed: {0}")]
    MalformedMessage(String),

    #[error("Notification {notification} exposes no renderer for any channel")]
    UnrenderableNotification { notification: String },
}
