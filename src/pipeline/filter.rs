//! Acceptance filter applied to a record before it is committed.
//!
//! The predicate receives a slice so the same filter can be shared with
//! collectors that judge records in batches; this collector always passes
//! exactly one record.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::record::NotificationRecord;

type Predicate = dyn Fn(&[NotificationRecord]) -> bool + Send + Sync;

/// Boolean acceptance predicate over candidate records.
#[derive(Clone)]
pub struct Filter {
    predicate: Arc<Predicate>,
}

impl Filter {
    /// Accept every record.
    pub fn accept_all() -> Self {
        Self::from_fn(|_| true)
    }

    /// Wrap an arbitrary predicate.
    pub fn from_fn<F>(predicate: F) -> Self
    where
        F: Fn(&[NotificationRecord]) -> bool + Send + Sync + 'static,
    {
        Self {
            predicate: Arc::new(predicate),
        }
    }

    /// Accept only records whose type is one of `channels`.
    pub fn channels<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed: HashSet<String> = channels.into_iter().map(Into::into).collect();
        Self::from_fn(move |records| records.iter().all(|r| allowed.contains(&r.kind)))
    }

    /// Accept only what both filters accept.
    pub fn and(self, other: Filter) -> Self {
        Self::from_fn(move |records| (self.predicate)(records) && (other.predicate)(records))
    }

    /// Run the predicate over a batch of records.
    pub fn passes(&self, records: &[NotificationRecord]) -> bool {
        (self.predicate)(records)
    }

    /// Run the predicate over a single candidate.
    pub fn accepts(&self, record: &NotificationRecord) -> bool {
        self.passes(std::slice::from_ref(record))
    }
}

impl Default for Filter {
    fn default() -> Self {
        Self::accept_all()
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Filter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NormalizedFields;

    fn record(kind: &str) -> NotificationRecord {
        NotificationRecord::new(kind, NormalizedFields::default(), 0.0, vec![])
    }

    #[test]
    fn accept_all_accepts() {
        assert!(Filter::accept_all().accepts(&record("mail")));
        assert!(Filter::default().accepts(&record("slack")));
    }

    #[test]
    fn channel_allowlist() {
        let filter = Filter::channels(["mail", "nexmo"]);
        assert!(filter.accepts(&record("mail")));
        assert!(filter.accepts(&record("nexmo")));
        assert!(!filter.accepts(&record("slack")));
    }

    #[test]
    fn predicate_sees_a_single_record() {
        let filter = Filter::from_fn(|records| records.len() == 1);
        assert!(filter.accepts(&record("mail")));
    }

    #[test]
    fn and_requires_both() {
        let has_subject = Filter::from_fn(|records| records.iter().all(|r| r.subject.is_some()));
        let filter = Filter::channels(["mail"]).and(has_subject);

        let mut with_subject = record("mail");
        with_subject.subject = Some("Hi".into());
        assert!(filter.accepts(&with_subject));
        assert!(!filter.accepts(&record("mail")));
    }
}
