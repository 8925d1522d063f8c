//! Status inference from raw session records.
//!
//! Rules are tried in order; the first match wins:
//!
//! | Marker | Previous | Idle time | Status |
//! |--------|----------|-----------|--------|
//! | processing | any | any | Processing |
//! | awaiting_input | unset / Processing | any | ReadyForInput |
//! | idle | any | > threshold | Waiting |
//! | awaiting_input | ReadyForInput | any | ReadyForInput |
//! | anything else, or malformed record | | | Unknown |
//!
//! The previous status only matters for `awaiting_input`: a reply is an
//! event when the session was seen working first, and stays one until the
//! marker changes.

use crate::data::{Marker, RawRecord, Status};
use std::time::Duration;

pub const DEFAULT_IDLE_THRESHOLD: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusClassifier {
    idle_threshold: Duration,
}

impl Default for StatusClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_THRESHOLD)
    }
}

impl StatusClassifier {
    pub fn new(idle_threshold: Duration) -> Self {
        Self { idle_threshold }
    }

    pub fn idle_threshold(&self) -> Duration {
        self.idle_threshold
    }

    /// Map a record to a status.
    ///
    /// Total and deterministic: `idle_for` is measured by the caller at scan
    /// time, so identical inputs always give identical output. `idle_for` is
    /// `None` when the record carries no last-activity time.
    pub fn classify(
        &self,
        record: &RawRecord,
        idle_for: Option<Duration>,
        previous: Option<Status>,
    ) -> Status {
        if record.is_malformed() {
            return Status::Unknown;
        }
        let Some(idle_for) = idle_for else {
            return Status::Unknown;
        };
        let past_threshold = idle_for > self.idle_threshold;

        match (record.marker(), previous) {
            (Marker::Processing, _) => Status::Processing,
            (Marker::AwaitingInput, None | Some(Status::Processing)) => Status::ReadyForInput,
            (Marker::Idle, _) if past_threshold => Status::Waiting,
            // Sticky until the marker itself changes
            (Marker::AwaitingInput, Some(Status::ReadyForInput)) => Status::ReadyForInput,
            // Reply never seen being produced, or an unrecognized state
            _ => Status::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(marker: &str) -> RawRecord {
        let now = Utc::now();
        RawRecord {
            id: "s1".to_string(),
            display_name: "proj".to_string(),
            marker: marker.to_string(),
            started_at: Some(now),
            last_activity: Some(now),
            slug: None,
            pid: Some(42),
        }
    }

    const FRESH: Option<Duration> = Some(Duration::from_secs(1));
    const STALE: Option<Duration> = Some(Duration::from_secs(31));

    #[test]
    fn processing_wins_regardless_of_history() {
        let c = StatusClassifier::default();
        for prev in Status::all().map(Some).chain([None]) {
            assert_eq!(c.classify(&record("processing"), STALE, prev), Status::Processing);
        }
    }

    #[test]
    fn awaiting_after_processing_is_ready() {
        let c = StatusClassifier::default();
        assert_eq!(
            c.classify(&record("awaiting_input"), FRESH, Some(Status::Processing)),
            Status::ReadyForInput
        );
        assert_eq!(
            c.classify(&record("awaiting_input"), FRESH, None),
            Status::ReadyForInput
        );
    }

    #[test]
    fn ready_is_sticky_past_the_threshold() {
        let c = StatusClassifier::default();
        let long = Some(Duration::from_secs(3600));
        assert_eq!(
            c.classify(&record("awaiting_input"), long, Some(Status::ReadyForInput)),
            Status::ReadyForInput
        );
    }

    #[test]
    fn awaiting_after_waiting_is_unknown() {
        let c = StatusClassifier::default();
        for idle in [FRESH, STALE] {
            assert_eq!(
                c.classify(&record("awaiting_input"), idle, Some(Status::Waiting)),
                Status::Unknown
            );
            assert_eq!(
                c.classify(&record("awaiting_input"), idle, Some(Status::Unknown)),
                Status::Unknown
            );
        }
    }

    #[test]
    fn idle_boundary_is_exclusive() {
        let c = StatusClassifier::new(Duration::from_secs(30));
        let at = Some(Duration::from_secs(30));
        assert_eq!(c.classify(&record("idle"), at, None), Status::Unknown);
        assert_eq!(c.classify(&record("idle"), STALE, None), Status::Waiting);
    }

    #[test]
    fn idle_within_threshold_is_unknown_whatever_came_before() {
        let c = StatusClassifier::default();
        for prev in Status::all().map(Some).chain([None]) {
            assert_eq!(c.classify(&record("idle"), FRESH, prev), Status::Unknown);
        }
    }

    #[test]
    fn idle_past_threshold_is_waiting_whatever_came_before() {
        let c = StatusClassifier::default();
        for prev in Status::all().map(Some).chain([None]) {
            assert_eq!(c.classify(&record("idle"), STALE, prev), Status::Waiting);
        }
    }

    #[test]
    fn unknown_markers_and_malformed_records() {
        let c = StatusClassifier::default();
        assert_eq!(c.classify(&record("compacting"), STALE, None), Status::Unknown);

        let mut broken = record("processing");
        broken.last_activity = None;
        assert_eq!(c.classify(&broken, None, Some(Status::Processing)), Status::Unknown);

        assert_eq!(c.classify(&record("processing"), None, None), Status::Unknown);
    }

    #[test]
    fn classification_is_deterministic() {
        let c = StatusClassifier::default();
        let r = record("awaiting_input");
        let first = c.classify(&r, FRESH, Some(Status::Processing));
        for _ in 0..10 {
            assert_eq!(c.classify(&r, FRESH, Some(Status::Processing)), first);
        }
    }
}
