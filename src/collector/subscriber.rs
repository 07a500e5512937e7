//! Event subscription — wires a collector into a dispatcher.

use std::sync::Arc;

use tracing::info;

use super::NotificationCollector;
use crate::events::{Dispatcher, EventKind, handler};

impl NotificationCollector {
    /// Register the message-sent and notification-sent handlers.
    ///
    /// Does nothing when the collector is disabled. Call once per
    /// dispatcher; registering twice records every event twice.
    pub fn listen_to_events(self: &Arc<Self>, dispatcher: &mut dyn Dispatcher) {
        if !self.config().enabled {
            info!("Notification collector disabled, not listening");
            return;
        }

        let collector = Arc::clone(self);
        dispatcher.listen(
            EventKind::MessageSent,
            handler(move |event| collector.handle(event)),
        );

        let collector = Arc::clone(self);
        dispatcher.listen(
            EventKind::NotificationSent,
            handler(move |event| collector.handle(event)),
        );

        info!("Notification collector listening for sent messages and notifications");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CollectorConfig;
    use crate::events::EventBus;

    #[test]
    fn registers_one_handler_per_kind() {
        let collector = Arc::new(NotificationCollector::default());
        let mut bus = EventBus::new();
        collector.listen_to_events(&mut bus);

        assert_eq!(bus.listener_count(EventKind::MessageSent), 1);
        assert_eq!(bus.listener_count(EventKind::NotificationSent), 1);
    }

    #[test]
    fn disabled_collector_registers_nothing() {
        let config = CollectorConfig {
            enabled: false,
            ..Default::default()
        };
        let collector = Arc::new(NotificationCollector::new(config).unwrap());
        let mut bus = EventBus::new();
        collector.listen_to_events(&mut bus);

        assert_eq!(bus.listener_count(EventKind::MessageSent), 0);
        assert_eq!(bus.listener_count(EventKind::NotificationSent), 0);
    }
}
