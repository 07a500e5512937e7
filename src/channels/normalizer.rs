//! Notification path — normalizes a sent notification into record fields.

use serde_json::{Map, Value};
use tracing::debug;

use crate::channels::address::{Recipient, format_notification_addresses};
use crate::channels::email::MAIL_TYPE;
use crate::channels::notification::{
    ChatMessage, MailMessage, Notifiable, Notification, RenderedNotification, TelephonyMessage,
};
use crate::error::CollectorError;
use crate::record::{Addresses, NormalizedFields};
use crate::trace::Serializer;
use crate::trace::serializer::snapshot;

/// A notification that was just delivered on one channel.
pub struct NotificationSent<'a> {
    /// Channel name the notification went out on; becomes the record type.
    pub channel: String,
    pub notification: &'a dyn Notification,
    pub notifiable: &'a dyn Notifiable,
    /// Whatever the channel driver returned, if anything.
    pub response: Option<Value>,
}

impl<'a> NotificationSent<'a> {
    pub fn new(
        channel: impl Into<String>,
        notification: &'a dyn Notification,
        notifiable: &'a dyn Notifiable,
    ) -> Self {
        Self {
            channel: channel.into(),
            notification,
            notifiable,
            response: None,
        }
    }

    pub fn with_response(mut self, response: Value) -> Self {
        self.response = Some(response);
        self
    }

    /// Whether this is the notification-level twin of a mail send.
    pub fn is_mail(&self) -> bool {
        self.channel == MAIL_TYPE
    }
}

impl std::fmt::Debug for NotificationSent<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationSent")
            .field("channel", &self.channel)
            .field("notification", &self.notification.name())
            .field("response", &self.response)
            .finish_non_exhaustive()
    }
}

/// Normalize a sent notification.
///
/// Fails only when the notification has no renderer at all.
pub fn normalize_notification(
    event: &NotificationSent<'_>,
    serializer: &dyn Serializer,
) -> Result<NormalizedFields, CollectorError> {
    let notification = event.notification;
    let rendered = notification.render(event.notifiable).ok_or_else(|| {
        CollectorError::UnrenderableNotification {
            notification: notification.name().to_string(),
        }
    })?;
    debug!(
        channel = %event.channel,
        rendered = rendered.label(),
        notification = notification.name(),
        "Normalizing notification"
    );

    let mut fields = match rendered {
        RenderedNotification::Mail(message) => mail_fields(event, message),
        RenderedNotification::Chat(message) => chat_fields(event, message),
        RenderedNotification::Telephony(message) => telephony_fields(event, message),
        RenderedNotification::Broadcast(message) => NormalizedFields {
            data: serializer.normalize_each(message.data),
            ..Default::default()
        },
        RenderedNotification::Generic(data) => NormalizedFields {
            data: serializer.normalize_each(data),
            ..Default::default()
        },
    };

    let mut raw = Map::new();
    raw.insert("notification".into(), snapshot(notification.to_value()));
    raw.insert("notifiable".into(), snapshot(event.notifiable.to_value()));
    raw.insert(
        "response".into(),
        event.response.clone().unwrap_or(Value::Null),
    );
    fields.data.extend(serializer.normalize_each(raw));

    Ok(fields)
}

fn default_subject(event: &NotificationSent<'_>, subject: Option<String>) -> Option<String> {
    subject.or_else(|| Some(event.notification.name().to_string()))
}

fn routed_to(event: &NotificationSent<'_>, channel: &str) -> Option<Addresses> {
    let route = event.notifiable.route_notification_for(channel);
    format_notification_addresses(route.as_ref()).map(Addresses::Many)
}

fn mail_fields(event: &NotificationSent<'_>, message: MailMessage) -> NormalizedFields {
    let mut data = Map::new();
    insert_recipients(&mut data, "cc", &message.cc);
    insert_recipients(&mut data, "bcc", &message.bcc);
    insert_recipients(&mut data, "replyTo", &message.reply_to);

    NormalizedFields {
        subject: default_subject(event, message.subject),
        from: message
            .from
            .map(|from| Addresses::Many(vec![from.display()])),
        to: routed_to(event, MAIL_TYPE),
        content: None,
        data,
    }
}

fn chat_fields(event: &NotificationSent<'_>, message: ChatMessage) -> NormalizedFields {
    NormalizedFields {
        subject: default_subject(event, None),
        from: message.username.map(Addresses::One),
        to: message.channel.map(Addresses::One),
        content: message.content,
        data: Map::new(),
    }
}

fn telephony_fields(event: &NotificationSent<'_>, message: TelephonyMessage) -> NormalizedFields {
    NormalizedFields {
        subject: default_subject(event, None),
        from: message.from.map(Addresses::One),
        to: routed_to(event, &event.channel),
        content: message.content,
        data: Map::new(),
    }
}

fn insert_recipients(data: &mut Map<String, Value>, key: &str, recipients: &[Recipient]) {
    if !recipients.is_empty() {
        let formatted: Vec<String> = recipients.iter().map(Recipient::display).collect();
        data.insert(key.to_string(), Value::from(formatted));
    }
}
