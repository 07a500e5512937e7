//! Send events and the dispatcher contract the collector subscribes through.

pub mod bus;

use crate::channels::{MessageSent, NotificationSent};

pub use bus::EventBus;

/// Which kind of send event a handler listens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A raw message was handed to the mail transport.
    MessageSent,
    /// A notification was delivered on some channel.
    NotificationSent,
}

/// A fired send event.
#[derive(Debug, Clone, Copy)]
pub enum SendEvent<'a> {
    MessageSent(&'a MessageSent),
    NotificationSent(&'a NotificationSent<'a>),
}

impl SendEvent<'_> {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::MessageSent(_) => EventKind::MessageSent,
            Self::NotificationSent(_) => EventKind::NotificationSent,
        }
    }
}

/// Event handler; runs synchronously on the dispatching thread.
pub type Handler = Box<dyn Fn(&SendEvent<'_>) + Send + Sync>;

/// Box a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&SendEvent<'_>) + Send + Sync + 'static,
{
    Box::new(f)
}

/// Anything handlers can be registered with.
pub trait Dispatcher {
    /// Register `handler` for every future event of `kind`.
    fn listen(&mut self, kind: EventKind, handler: Handler);
}
