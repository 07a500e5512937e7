//! Notification model — what a notification can render itself into, and who receives it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::address::{Recipient, Route};

/// A mail-channel rendering of a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    pub subject: Option<String>,
    pub from: Option<Recipient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cc: Vec<Recipient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bcc: Vec<Recipient>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub reply_to: Vec<Recipient>,
}

impl MailMessage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn from(mut self, from: impl Into<Recipient>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn cc(mut self, cc: impl Into<Recipient>) -> Self {
        self.cc.push(cc.into());
        self
    }

    pub fn bcc(mut self, bcc: impl Into<Recipient>) -> Self {
        self.bcc.push(bcc.into());
        self
    }

    pub fn reply_to(mut self, reply_to: impl Into<Recipient>) -> Self {
        self.reply_to.push(reply_to.into());
        self
    }
}

/// A chat (Slack-style) rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Display name the message is posted as.
    pub username: Option<String>,
    /// Channel the message is posted to.
    pub channel: Option<String>,
    pub content: Option<String>,
}

/// A telephony (SMS) rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelephonyMessage {
    /// Sender number or alphanumeric ID.
    pub from: Option<String>,
    pub content: Option<String>,
}

/// A broadcast rendering: an event payload pushed to listeners.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    pub data: Map<String, Value>,
}

/// The one rendering a notification yields, in channel priority order.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderedNotification {
    Mail(MailMessage),
    Chat(ChatMessage),
    Telephony(TelephonyMessage),
    Broadcast(BroadcastMessage),
    Generic(Map<String, Value>),
}

impl RenderedNotification {
    /// Short label for logging.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Mail(_) => "mail",
            Self::Chat(_) => "chat",
            Self::Telephony(_) => "telephony",
            Self::Broadcast(_) => "broadcast",
            Self::Generic(_) => "generic",
        }
    }
}

/// A notification as the host application defines it.
///
/// Each renderer is optional. [`Notification::render`] picks the first one
/// present in the order mail, chat, telephony, broadcast, generic.
pub trait Notification {
    /// Name used as the default subject.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    fn to_mail(&self, _notifiable: &dyn Notifiable) -> Option<MailMessage> {
        None
    }

    fn to_slack(&self, _notifiable: &dyn Notifiable) -> Option<ChatMessage> {
        None
    }

    fn to_sms(&self, _notifiable: &dyn Notifiable) -> Option<TelephonyMessage> {
        None
    }

    fn to_broadcast(&self, _notifiable: &dyn Notifiable) -> Option<BroadcastMessage> {
        None
    }

    fn to_array(&self, _notifiable: &dyn Notifiable) -> Option<Map<String, Value>> {
        None
    }

    /// Snapshot stored under `data.notification`.
    fn to_value(&self) -> serde_json::Result<Value>;

    /// Render through the highest-priority renderer this notification has.
    ///
    /// `None` means the notification cannot describe itself at all.
    fn render(&self, notifiable: &dyn Notifiable) -> Option<RenderedNotification> {
        if let Some(message) = self.to_mail(notifiable) {
            return Some(RenderedNotification::Mail(message));
        }
        if let Some(message) = self.to_slack(notifiable) {
            return Some(RenderedNotification::Chat(message));
        }
        if let Some(message) = self.to_sms(notifiable) {
            return Some(RenderedNotification::Telephony(message));
        }
        if let Some(message) = self.to_broadcast(notifiable) {
            return Some(RenderedNotification::Broadcast(message));
        }
        self.to_array(notifiable).map(RenderedNotification::Generic)
    }
}

/// An entity that receives notifications.
pub trait Notifiable {
    /// Where this entity receives notifications on `channel`, if anywhere.
    fn route_notification_for(&self, channel: &str) -> Option<Route>;

    /// Snapshot stored under `data.notifiable`.
    fn to_value(&self) -> serde_json::Result<Value>;
}
