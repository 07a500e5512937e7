//! Mail path — normalizes a raw sent message into record fields.
//!
//! The message is read back from its wire form with `mail-parser`, so any
//! transport that can hand over the formatted bytes is supported. Messages
//! built with `lettre` convert directly.

use mail_parser::{MessageParser, MimeHeaders};
use serde_json::{Map, Value};

use crate::channels::address::{format_message_addresses, message_address_pairs};
use crate::error::CollectorError;
use crate::record::{Addresses, NormalizedFields};
use crate::trace::serializer::snapshot;
use crate::trace::{Serializer, StackFrame, StackTraceProvider};

/// Record tag for the mail path.
pub const MAIL_TYPE: &str = "mail";

/// A message that was just handed to the mail transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSent {
    raw: Vec<u8>,
}

impl MessageSent {
    /// Wrap an already formatted RFC 5322 message.
    pub fn from_raw(raw: impl Into<Vec<u8>>) -> Self {
        Self { raw: raw.into() }
    }

    /// Formatted bytes of the message.
    pub fn raw(&self) -> &[u8] {
        &self.raw
    }
}

impl From<&lettre::Message> for MessageSent {
    fn from(message: &lettre::Message) -> Self {
        Self::from_raw(message.formatted())
    }
}

/// Normalize a sent message.
///
/// `trace` is the already captured, view-resolved stack; when
/// `collect_mailables` is set, the nearest mailable receiver on it is
/// serialized into `data.mailable`.
pub fn normalize_message(
    event: &MessageSent,
    trace: &[StackFrame],
    stack: &dyn StackTraceProvider,
    serializer: &dyn Serializer,
    collect_mailables: bool,
) -> Result<NormalizedFields, CollectorError> {
    if event.raw.is_empty() {
        return Err(CollectorError::MalformedMessage("message is empty".into()));
    }
    let parsed = MessageParser::default()
        .parse(event.raw())
        .ok_or_else(|| CollectorError::MalformedMessage("no headers or body found".into()))?;

    let mut data = Map::new();
    insert_addresses(&mut data, "cc", parsed.cc());
    insert_addresses(&mut data, "bcc", parsed.bcc());
    insert_addresses(&mut data, "replyTo", parsed.reply_to());

    if collect_mailables
        && let Some(mailable) = stack
            .first_matching(trace, &|frame| frame.mailable().is_some())
            .and_then(StackFrame::mailable)
    {
        data.insert(
            "mailable".into(),
            serializer.normalize(snapshot(mailable.to_value())),
        );
    }

    Ok(NormalizedFields {
        subject: parsed.subject().map(str::to_string),
        from: format_message_addresses(message_address_pairs(parsed.from())).map(Addresses::Many),
        to: format_message_addresses(message_address_pairs(parsed.to())).map(Addresses::Many),
        content: extract_text(&parsed),
        data,
    })
}

fn insert_addresses(
    data: &mut Map<String, Value>,
    key: &str,
    addr: Option<&mail_parser::Address<'_>>,
) {
    if let Some(formatted) = format_message_addresses(message_address_pairs(addr)) {
        data.insert(key.to_string(), Value::from(formatted));
    }
}

/// Strip HTML tags from content (basic).
pub fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extract readable text from a parsed message.
fn extract_text(parsed: &mail_parser::Message) -> Option<String> {
    if let Some(text) = parsed.body_text(0) {
        return Some(text.into_owned());
    }
    if let Some(html) = parsed.body_html(0) {
        return Some(strip_html(html.as_ref()));
    }
    for part in parsed.attachments() {
        let part: &mail_parser::MessagePart = part;
        if let Some(ct) = MimeHeaders::content_type(part)
            && ct.ctype() == "text"
            && let Ok(text) = std::str::from_utf8(part.contents())
        {
            return Some(text.to_string());
        }
    }
    None
}

#[cfg(test)]
#[path = "email_tests.rs"]
mod tests;
