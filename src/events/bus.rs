//! In-process synchronous event bus.
//!
//! Handlers run in registration order on the thread that calls
//! [`EventBus::dispatch`]. There is no queue: an event with no listeners is
//! simply dropped.

use std::fmt;

use tracing::trace;

use super::{Dispatcher, EventKind, Handler, SendEvent};

/// Synchronous [`Dispatcher`] implementation.
#[derive(Default)]
pub struct EventBus {
    handlers: Vec<(EventKind, Handler)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every handler registered for the event's kind.
    ///
    /// Returns the number of handlers invoked.
    pub fn dispatch(&self, event: &SendEvent<'_>) -> usize {
        let kind = event.kind();
        let mut invoked = 0;
        for (_, handler) in self.handlers.iter().filter(|(k, _)| *k == kind) {
            handler(event);
            invoked += 1;
        }
        trace!(kind = ?kind, handlers = invoked, "Dispatched send event");
        invoked
    }

    /// Number of handlers registered for `kind`.
    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.handlers.iter().filter(|(k, _)| *k == kind).count()
    }
}

impl Dispatcher for EventBus {
    fn listen(&mut self, kind: EventKind, handler: Handler) {
        self.handlers.push((kind, handler));
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("message_sent", &self.listener_count(EventKind::MessageSent))
            .field(
                "notification_sent",
                &self.listener_count(EventKind::NotificationSent),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::MessageSent;
    use crate::events::handler;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter(hits: &Arc<AtomicUsize>) -> Handler {
        let hits = Arc::clone(hits);
        handler(move |_| {
            hits.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn dispatch_only_reaches_matching_kind() {
        let mail_hits = Arc::new(AtomicUsize::new(0));
        let notification_hits = Arc::new(AtomicUsize::new(0));

        let mut bus = EventBus::new();
        bus.listen(EventKind::MessageSent, counter(&mail_hits));
        bus.listen(EventKind::NotificationSent, counter(&notification_hits));

        let message = MessageSent::from_raw("Subject: hi\r\n\r\nbody");
        assert_eq!(bus.dispatch(&SendEvent::MessageSent(&message)), 1);

        assert_eq!(mail_hits.load(Ordering::SeqCst), 1);
        assert_eq!(notification_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handlers_run_in_registration_order() {
        let order = Arc::new(std::sync::Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for i in 0..3 {
            let order = Arc::clone(&order);
            bus.listen(
                EventKind::MessageSent,
                handler(move |_| order.lock().unwrap().push(i)),
            );
        }

        let message = MessageSent::from_raw("Subject: hi\r\n\r\nbody");
        bus.dispatch(&SendEvent::MessageSent(&message));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn event_without_listeners_is_dropped() {
        let bus = EventBus::new();
        let message = MessageSent::from_raw("Subject: hi\r\n\r\nbody");
        assert_eq!(bus.dispatch(&SendEvent::MessageSent(&message)), 0);
        assert_eq!(bus.listener_count(EventKind::NotificationSent), 0);
    }
}
