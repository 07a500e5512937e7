//! Channel normalizers — one per kind of send event.

pub mod address;
pub mod email;
pub mod normalizer;
pub mod notification;

pub use address::{Recipient, Route, format_message_addresses, format_notification_addresses};
pub use email::{MAIL_TYPE, MessageSent, normalize_message};
pub use normalizer::{NotificationSent, normalize_notification};
pub use notification::{
    BroadcastMessage, ChatMessage, MailMessage, Notifiable, Notification, RenderedNotification,
    TelephonyMessage,
};
