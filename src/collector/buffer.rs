//! Collector buffer — the records committed during one unit of work.

use uuid::Uuid;

use crate::record::NotificationRecord;

/// Host-side collection that resolved records are appended to.
pub trait NotificationSink {
    fn notifications_mut(&mut self) -> &mut Vec<NotificationRecord>;
}

impl NotificationSink for Vec<NotificationRecord> {
    fn notifications_mut(&mut self) -> &mut Vec<NotificationRecord> {
        self
    }
}

/// Outgoing record of one unit of work, as handed to inspection tooling.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub notifications: Vec<NotificationRecord>,
}

impl RequestRecord {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            notifications: Vec::new(),
        }
    }
}

impl NotificationSink for RequestRecord {
    fn notifications_mut(&mut self) -> &mut Vec<NotificationRecord> {
        &mut self.notifications
    }
}

/// Ordered, unbounded list of committed records.
#[derive(Debug, Clone, Default)]
pub struct CollectorBuffer {
    records: Vec<NotificationRecord>,
}

impl CollectorBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commit a record at the end of the buffer.
    pub fn append(&mut self, record: NotificationRecord) {
        self.records.push(record);
    }

    /// Most recently committed record; the only one the correlator may touch.
    pub(crate) fn last_mut(&mut self) -> Option<&mut NotificationRecord> {
        self.records.last_mut()
    }

    /// Append copies of all records to `sink`, after anything already there.
    ///
    /// The buffer itself is left untouched.
    pub fn drain_into<S: NotificationSink + ?Sized>(&self, sink: &mut S) {
        sink.notifications_mut()
            .extend(self.records.iter().cloned());
    }

    /// Drop every record.
    pub fn reset(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[NotificationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NormalizedFields;

    fn record(subject: &str) -> NotificationRecord {
        NotificationRecord::new(
            "mail",
            NormalizedFields {
                subject: Some(subject.into()),
                ..Default::default()
            },
            0.0,
            vec![],
        )
    }

    #[test]
    fn drain_appends_after_existing_content() {
        let mut buffer = CollectorBuffer::new();
        buffer.append(record("second"));
        buffer.append(record("third"));

        let mut host = RequestRecord::new();
        host.notifications.push(record("first"));
        buffer.drain_into(&mut host);

        let subjects: Vec<_> = host
            .notifications
            .iter()
            .map(|r| r.subject.as_deref().unwrap())
            .collect();
        assert_eq!(subjects, vec!["first", "second", "third"]);
        assert_eq!(buffer.len(), 2);
    }

    #[test]
    fn reset_on_empty_buffer_contributes_nothing() {
        let mut buffer = CollectorBuffer::new();
        buffer.reset();

        let mut host = vec![record("existing")];
        buffer.drain_into(&mut host);
        assert_eq!(host.len(), 1);
    }

    #[test]
    fn reset_after_append_contributes_nothing() {
        let mut buffer = CollectorBuffer::new();
        buffer.append(record("gone"));
        buffer.reset();
        assert!(buffer.is_empty());

        let mut host = RequestRecord::new();
        buffer.drain_into(&mut host);
        assert!(host.notifications.is_empty());
    }

    #[test]
    fn last_mut_is_the_tail() {
        let mut buffer = CollectorBuffer::new();
        assert!(buffer.last_mut().is_none());
        buffer.append(record("a"));
        buffer.append(record("b"));
        assert_eq!(buffer.last_mut().unwrap().subject.as_deref(), Some("b"));
    }
}
