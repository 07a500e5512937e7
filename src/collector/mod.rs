//! The notification collector — one instance per unit of work.
//!
//! Flow for every observed event:
//! capture stack + time → normalize → correlate (mail notifications only)
//! → filter → append.

pub mod buffer;
pub mod subscriber;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, error, info, warn};

use crate::channels::{MessageSent, NotificationSent, normalize_message, normalize_notification};
use crate::channels::email::MAIL_TYPE;
use crate::config::CollectorConfig;
use crate::error::{CollectorError, ConfigError};
use crate::events::SendEvent;
use crate::pipeline::{Correlation, Filter, correlate};
use crate::record::{NormalizedFields, NotificationRecord, capture_time};
use crate::trace::{CallStack, JsonSerializer, Serializer, StackFrame, StackTraceProvider};

pub use buffer::{CollectorBuffer, NotificationSink, RequestRecord};

/// Record type for notifications fired without a channel name.
const UNNAMED_CHANNEL: &str = "notification";

/// Collects the messages and notifications sent during one unit of work.
///
/// Never share an instance between concurrently running units of work;
/// create one per request and [`reset`](Self::reset) it between requests.
pub struct NotificationCollector {
    config: CollectorConfig,
    buffer: Mutex<CollectorBuffer>,
    filter: Filter,
    stack: Arc<dyn StackTraceProvider>,
    serializer: Arc<dyn Serializer>,
}

impl NotificationCollector {
    /// Create a collector with the default serializer, an empty call stack
    /// and an accept-all filter.
    pub fn new(config: CollectorConfig) -> Result<Self, ConfigError> {
        let serializer = JsonSerializer::new(&config)?;
        Ok(Self {
            config,
            buffer: Mutex::new(CollectorBuffer::new()),
            filter: Filter::accept_all(),
            stack: CallStack::new(),
            serializer: Arc::new(serializer),
        })
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_stack(mut self, stack: Arc<dyn StackTraceProvider>) -> Self {
        self.stack = stack;
        self
    }

    pub fn with_serializer(mut self, serializer: Arc<dyn Serializer>) -> Self {
        self.serializer = serializer;
        self
    }

    pub fn config(&self) -> &CollectorConfig {
        &self.config
    }

    // ── Record construction ─────────────────────────────────────────

    /// Build the record for a sent message without committing it.
    pub fn record_message(&self, event: &MessageSent) -> Result<NotificationRecord, CollectorError> {
        let time = capture_time();
        let trace = self.capture_trace();
        let fields = normalize_message(
            event,
            &trace,
            self.stack.as_ref(),
            self.serializer.as_ref(),
            self.config.collect_mailables,
        )?;
        Ok(self.build(MAIL_TYPE, fields, time, &trace))
    }

    /// Build the record for a sent notification without committing it.
    pub fn record_notification(
        &self,
        event: &NotificationSent<'_>,
    ) -> Result<NotificationRecord, CollectorError> {
        let time = capture_time();
        let trace = self.capture_trace();
        let fields = normalize_notification(event, self.serializer.as_ref())?;
        let kind = if event.channel.is_empty() {
            UNNAMED_CHANNEL
        } else {
            event.channel.as_str()
        };
        Ok(self.build(kind, fields, time, &trace))
    }

    fn capture_trace(&self) -> Vec<StackFrame> {
        self.stack.resolve_view_names(self.stack.capture())
    }

    fn build(
        &self,
        kind: &str,
        fields: NormalizedFields,
        time: f64,
        trace: &[StackFrame],
    ) -> NotificationRecord {
        NotificationRecord::new(kind, fields, time, self.serializer.shorten_trace(trace))
    }

    // ── Event handlers ──────────────────────────────────────────────

    /// Route any send event to its handler.
    pub fn handle(&self, event: &SendEvent<'_>) {
        match event {
            SendEvent::MessageSent(message) => self.handle_message_sent(message),
            SendEvent::NotificationSent(notification) => {
                self.handle_notification_sent(notification)
            }
        }
    }

    /// Handle a raw mail send. Failures are logged, never propagated.
    pub fn handle_message_sent(&self, event: &MessageSent) {
        match self.record_message(event) {
            Ok(record) => self.commit(record),
            Err(e) => warn!(error = %e, "Dropped sent message the collector could not read"),
        }
    }

    /// Handle a notification send. Failures are logged, never propagated.
    ///
    /// Mail-channel notifications are first offered to the correlator.
    pub fn handle_notification_sent(&self, event: &NotificationSent<'_>) {
        let record = match self.record_notification(event) {
            Ok(record) => record,
            Err(e) => {
                error!(channel = %event.channel, error = %e, "Dropped notification");
                return;
            }
        };

        if !event.is_mail() {
            self.commit(record);
            return;
        }

        // The guard must be released before `commit` locks again.
        let outcome = correlate(&mut self.lock_buffer(), record);
        if let Correlation::Unmatched(record) = outcome {
            self.commit(record);
        }
    }

    /// Apply the filter and append accepted records.
    fn commit(&self, record: NotificationRecord) {
        if !self.filter.accepts(&record) {
            debug!(record_id = %record.id, kind = %record.kind, "Record rejected by filter");
            return;
        }
        debug!(
            record_id = %record.id,
            kind = %record.kind,
            subject = ?record.subject,
            "Record collected"
        );
        self.lock_buffer().append(record);
    }

    // ── Buffer access ───────────────────────────────────────────────

    /// Append copies of every collected record to the host's collection.
    pub fn resolve<S: NotificationSink + ?Sized>(&self, sink: &mut S) {
        self.lock_buffer().drain_into(sink);
    }

    /// Forget every collected record, ready for the next unit of work.
    pub fn reset(&self) {
        let mut buffer = self.lock_buffer();
        let dropped = buffer.len();
        buffer.reset();
        info!(dropped, "Notification collector reset");
    }

    /// Snapshot of the collected records.
    pub fn records(&self) -> Vec<NotificationRecord> {
        self.lock_buffer().records().to_vec()
    }

    pub fn len(&self) -> usize {
        self.lock_buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_buffer().is_empty()
    }

    fn lock_buffer(&self) -> MutexGuard<'_, CollectorBuffer> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NotificationCollector {
    fn default() -> Self {
        Self {
            config: CollectorConfig::default(),
            buffer: Mutex::new(CollectorBuffer::new()),
            filter: Filter::accept_all(),
            stack: CallStack::new(),
            serializer: Arc::new(JsonSerializer::default()),
        }
    }
}

impl std::fmt::Debug for NotificationCollector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationCollector")
            .field("config", &self.config)
            .field("records", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::{ChatMessage, Notifiable, Notification, Route};
    use serde_json::{Value, json};

    struct Team;

    impl Notifiable for Team {
        fn route_notification_for(&self, _: &str) -> Option<Route> {
            None
        }
        fn to_value(&self) -> serde_json::Result<Value> {
            Ok(json!({ "team": "ops" }))
        }
    }

    struct BuildFailed;

    impl Notification for BuildFailed {
        fn to_slack(&self, _: &dyn Notifiable) -> Option<ChatMessage> {
            Some(ChatMessage {
                username: Some("ci".into()),
                channel: Some("#builds".into()),
                content: Some("Build failed".into()),
            })
        }
        fn to_value(&self) -> serde_json::Result<Value> {
            Ok(json!({ "build": 12 }))
        }
    }

    #[test]
    fn handle_routes_each_event_kind() {
        let collector = NotificationCollector::default();
        let message = MessageSent::from_raw(
            "From: ci@example.com\r\nTo: ops@example.com\r\nSubject: Build failed\r\n\r\nSee logs.\r\n",
        );
        collector.handle(&SendEvent::MessageSent(&message));

        let notification = NotificationSent::new("slack", &BuildFailed, &Team);
        collector.handle(&SendEvent::NotificationSent(&notification));

        let records = collector.records();
        let kinds: Vec<&str> = records.iter().map(|r| r.kind.as_str()).collect();
        assert_eq!(kinds, vec!["mail", "slack"]);
        assert_eq!(records[0].subject.as_deref(), Some("Build failed"));
        assert_eq!(records[1].content.as_deref(), Some("Build failed"));
    }

    #[test]
    fn handle_drops_failures_without_recording() {
        let collector = NotificationCollector::default();
        collector.handle(&SendEvent::MessageSent(&MessageSent::from_raw(Vec::new())));
        assert!(collector.is_empty());
    }
}
