//! Notification collector — records the mail and notifications a unit of work sends.
//!
//! Subscribe a [`NotificationCollector`] to a [`Dispatcher`](events::Dispatcher),
//! let the unit of work run, then [`resolve`](NotificationCollector::resolve)
//! the collected records into the outgoing request record and
//! [`reset`](NotificationCollector::reset) for the next one.

pub mod channels;
pub mod collector;
pub mod config;
pub mod error;
pub mod events;
pub mod pipeline;
pub mod record;
pub mod trace;

pub use collector::{NotificationCollector, NotificationSink, RequestRecord};
pub use config::CollectorConfig;
pub use error::{CollectorError, ConfigError};
pub use record::{Addresses, NotificationRecord, TraceEntry};
