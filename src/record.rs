//! Notification record — the normalized shape of one observed delivery.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Sender or recipient field of a record.
///
/// Mail paths always produce `Many`; chat and telephony senders are a single
/// handle or number and stay `One`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Addresses {
    One(String),
    Many(Vec<String>),
}

impl Addresses {
    /// String-joined form, used as the correlation key between records.
    pub fn joined(&self) -> String {
        match self {
            Self::One(address) => address.clone(),
            Self::Many(addresses) => addresses.join(", "),
        }
    }

}

impl From<Vec<String>> for Addresses {
    fn from(addresses: Vec<String>) -> Self {
        Self::Many(addresses)
    }
}

impl From<String> for Addresses {
    fn from(address: String) -> Self {
        Self::One(address)
    }
}

impl From<&str> for Addresses {
    fn from(address: &str) -> Self {
        Self::One(address.to_string())
    }
}

/// One display-ready frame of a record's call stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub file: Option<String>,
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

/// Channel-specific part of a record, produced by the normalizers.
///
/// Absent fields stay `None`; `data` starts empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedFields {
    pub subject: Option<String>,
    pub from: Option<Addresses>,
    pub to: Option<Addresses>,
    pub content: Option<String>,
    pub data: Map<String, Value>,
}

/// A single observed outgoing message or notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Unique record ID.
    pub id: Uuid,
    /// Human subject or title.
    pub subject: Option<String>,
    /// Canonical sender address(es).
    pub from: Option<Addresses>,
    /// Canonical recipient address(es).
    pub to: Option<Addresses>,
    /// Rendered body, where the channel exposes one.
    pub content: Option<String>,
    /// Channel tag: `mail`, `slack`, `nexmo`, or the raw channel name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Channel-specific extra fields, already normalized.
    pub data: Map<String, Value>,
    /// Capture time in epoch seconds.
    pub time: f64,
    /// Call stack at capture time, innermost first.
    pub trace: Vec<TraceEntry>,
    /// File of the first trace entry.
    pub file: Option<String>,
    /// Line of the first trace entry.
    pub line: Option<u32>,
}

impl NotificationRecord {
    /// Assemble a record from normalized fields.
    ///
    /// `file`/`line` are taken from the first trace entry, or left absent when
    /// the trace is empty.
    pub fn new(
        kind: impl Into<String>,
        fields: NormalizedFields,
        time: f64,
        trace: Vec<TraceEntry>,
    ) -> Self {
        let (file, line) = trace
            .first()
            .map(|entry| (entry.file.clone(), entry.line))
            .unwrap_or((None, None));

        Self {
            id: Uuid::new_v4(),
            subject: fields.subject,
            from: fields.from,
            to: fields.to,
            content: fields.content,
            kind: kind.into(),
            data: fields.data,
            time,
            trace,
            file,
            line,
        }
    }

    /// Correlation key: the joined `to` field. Records without recipients
    /// have no key and never correlate.
    pub fn to_key(&self) -> Option<String> {
        self.to.as_ref().map(Addresses::joined)
    }
}

/// Current time as fractional epoch seconds.
pub fn capture_time() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
