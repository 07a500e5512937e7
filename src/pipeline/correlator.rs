//! Correlator — folds a mail notification into the raw mail send it came from.
//!
//! Sending a notification over the mail channel fires both a message-sent
//! and a notification-sent event for the same delivery. The notification
//! event arrives second, so it is matched against the buffer tail only.
//! An unrelated record committed in between defeats the match and both
//! records are kept.

use serde_json::{Map, Value};
use tracing::debug;

use crate::collector::buffer::CollectorBuffer;
use crate::record::NotificationRecord;

/// Outcome of a correlation attempt.
#[derive(Debug)]
pub enum Correlation {
    /// The record's data was folded into the buffer tail.
    Merged,
    /// No match; the record continues to the filter.
    Unmatched(NotificationRecord),
}

/// Try to merge `record` into the last buffered record.
///
/// Matches when both records have recipients and their joined `to` fields
/// are equal.
pub fn correlate(buffer: &mut CollectorBuffer, record: NotificationRecord) -> Correlation {
    let Some(last) = buffer.last_mut() else {
        return Correlation::Unmatched(record);
    };

    let Some(key) = record.to_key() else {
        return Correlation::Unmatched(record);
    };
    if last.to_key().as_deref() != Some(key.as_str()) {
        return Correlation::Unmatched(record);
    }

    debug!(
        record_id = %last.id,
        to = %key,
        keys = record.data.len(),
        "Merged mail notification into sent message"
    );
    merge_data(&mut last.data, record.data);
    Correlation::Merged
}

/// Shallow key-wise union; keys from `incoming` win on collision.
pub fn merge_data(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        target.insert(key, value);
    }
}
