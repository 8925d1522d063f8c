//! Session registry: previous-scan state, diffing and lifecycle.
//!
//! The registry is the only owner of [`Session`] and [`NotificationRecord`]
//! values. A scan goes `ingest` (or `mark_unavailable`) then `diff`; the
//! transitions handed out by `diff` are drained, so each appearance, change
//! and disappearance is reported exactly once.

use super::classifier::StatusClassifier;
use crate::data::{RawRecord, Session, SnapshotEntry, Status, Transition};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;

/// Consecutive failed scans tolerated before every session is evicted.
pub const DEFAULT_UNAVAILABLE_GRACE: u32 = 10;

/// Last notification fired for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub id: String,
    pub status: Status,
    pub notified_at: DateTime<Utc>,
}

/// Per-session notification bookkeeping, at most one record per id.
#[derive(Debug, Default)]
pub struct NotificationLedger {
    records: HashMap<String, NotificationRecord>,
}

impl NotificationLedger {
    pub fn get(&self, id: &str) -> Option<&NotificationRecord> {
        self.records.get(id)
    }

    pub fn record(&mut self, id: &str, status: Status, at: DateTime<Utc>) {
        self.records.insert(
            id.to_string(),
            NotificationRecord {
                id: id.to_string(),
                status,
                notified_at: at,
            },
        );
    }

    pub fn clear(&mut self, id: &str) -> Option<NotificationRecord> {
        self.records.remove(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<String, Session>,
    pending: Vec<Transition>,
    ledger: NotificationLedger,
    unavailable_streak: u32,
    unavailable_grace: u32,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_UNAVAILABLE_GRACE)
    }
}

impl SessionRegistry {
    pub fn new(unavailable_grace: u32) -> Self {
        Self {
            sessions: HashMap::new(),
            pending: Vec::new(),
            ledger: NotificationLedger::default(),
            unavailable_streak: 0,
            unavailable_grace: unavailable_grace.max(1),
        }
    }

    /// Classify a fresh scan and make it the live set.
    ///
    /// Returns the snapshot for this scan, most recently active first.
    /// Sessions missing from `records` are queued as disappearances.
    pub fn ingest(
        &mut self,
        records: Vec<RawRecord>,
        classifier: &StatusClassifier,
        now: DateTime<Utc>,
    ) -> Vec<SnapshotEntry> {
        self.unavailable_streak = 0;

        let mut next: HashMap<String, Session> = HashMap::with_capacity(records.len());
        let mut entries = Vec::with_capacity(records.len());

        for record in records {
            if next.contains_key(&record.id) {
                tracing::warn!(id = %record.id, "duplicate session id in one scan, keeping the first");
                continue;
            }

            let previous = self.sessions.get(&record.id).map(|s| s.status);
            let idle_for = record.last_activity.map(|at| since(at, now));
            let status = classifier.classify(&record, idle_for, previous);
            let elapsed = record
                .started_at
                .map(|at| since(at, now))
                .unwrap_or_default();

            if previous != Some(status) {
                self.pending.push(Transition {
                    id: record.id.clone(),
                    display_name: record.display_name.clone(),
                    slug: record.slug.clone(),
                    from: previous,
                    to: Some(status),
                });
            }

            let session = Session::from_record(record, status);
            entries.push(SnapshotEntry {
                session: session.clone(),
                status,
                elapsed,
            });
            next.insert(session.id.clone(), session);
        }

        let mut gone: Vec<Session> = self
            .sessions
            .drain()
            .filter_map(|(id, session)| (!next.contains_key(&id)).then_some(session))
            .collect();
        self.queue_disappearances(&mut gone);
        self.sessions = next;

        entries.sort_by(|a, b| {
            b.session
                .last_activity
                .cmp(&a.session.last_activity)
                .then_with(|| a.session.id.cmp(&b.session.id))
        });
        entries
    }

    /// Record a scan whose source was unavailable.
    ///
    /// The live set is left alone until the failure streak reaches the grace
    /// period; then every session is queued as a disappearance, once.
    /// Returns the current streak length.
    pub fn mark_unavailable(&mut self) -> u32 {
        self.unavailable_streak = self.unavailable_streak.saturating_add(1);
        if self.unavailable_streak >= self.unavailable_grace && !self.sessions.is_empty() {
            let mut gone: Vec<Session> = self.sessions.drain().map(|(_, s)| s).collect();
            self.queue_disappearances(&mut gone);
        }
        self.unavailable_streak
    }

    /// Hand out this scan's transitions and evict the sessions that disappeared.
    pub fn diff(&mut self) -> Vec<Transition> {
        let transitions = std::mem::take(&mut self.pending);
        for t in transitions.iter().filter(|t| t.is_disappearance()) {
            self.ledger.clear(&t.id);
        }
        transitions
    }

    fn queue_disappearances(&mut self, gone: &mut [Session]) {
        gone.sort_by(|a, b| a.id.cmp(&b.id));
        for session in gone.iter() {
            self.pending.push(Transition {
                id: session.id.clone(),
                display_name: session.display_name.clone(),
                slug: session.slug.clone(),
                from: Some(session.status),
                to: None,
            });
        }
    }

    pub fn get(&self, id: &str) -> Option<&Session> {
        self.sessions.get(id)
    }

    pub fn status_of(&self, id: &str) -> Option<Status> {
        self.sessions.get(id).map(|s| s.status)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn unavailable_streak(&self) -> u32 {
        self.unavailable_streak
    }

    pub fn ledger(&self) -> &NotificationLedger {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut NotificationLedger {
        &mut self.ledger
    }
}

/// Non-negative time between `at` and `now`; future timestamps count as zero.
fn since(at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    now.signed_duration_since(at).to_std().unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, marker: &str, now: DateTime<Utc>) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            display_name: "proj".to_string(),
            marker: marker.to_string(),
            started_at: Some(now - chrono::Duration::seconds(90)),
            last_activity: Some(now),
            slug: None,
            pid: None,
        }
    }

    #[test]
    fn since_clamps_future_timestamps() {
        let now = Utc::now();
        assert_eq!(since(now + chrono::Duration::seconds(5), now), Duration::ZERO);
        assert_eq!(since(now - chrono::Duration::seconds(5), now), Duration::from_secs(5));
    }

    #[test]
    fn elapsed_is_measured_from_start() {
        let now = Utc::now();
        let mut registry = SessionRegistry::default();
        let entries = registry.ingest(
            vec![record("a", "processing", now)],
            &StatusClassifier::default(),
            now,
        );
        assert_eq!(entries[0].elapsed, Duration::from_secs(90));
    }

    #[test]
    fn duplicate_ids_keep_first_record() {
        let now = Utc::now();
        let mut registry = SessionRegistry::default();
        let entries = registry.ingest(
            vec![record("a", "processing", now), record("a", "idle", now)],
            &StatusClassifier::default(),
            now,
        );
        assert_eq!(entries.len(), 1);
        assert_eq!(registry.status_of("a"), Some(Status::Processing));
    }

    #[test]
    fn grace_of_zero_is_treated_as_one() {
        let now = Utc::now();
        let mut registry = SessionRegistry::new(0);
        registry.ingest(vec![record("a", "processing", now)], &StatusClassifier::default(), now);
        registry.diff();
        assert_eq!(registry.mark_unavailable(), 1);
        assert!(registry.is_empty());
    }
}
