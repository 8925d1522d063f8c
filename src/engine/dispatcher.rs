//! Notification policy.
//!
//! Fires only when a session moves into `ReadyForInput` from some other
//! observed status, and only while notifications are enabled. The ledger
//! entry written on fire blocks repeats until the session leaves that status.

use super::registry::NotificationLedger;
use crate::data::{Notification, Status, Transition};
use chrono::{DateTime, Utc};

pub const NEEDS_INPUT_TITLE: &str = "Claude Needs Input";

#[derive(Debug, Clone, Default)]
pub struct NotificationDispatcher {
    sound: Option<String>,
}

impl NotificationDispatcher {
    pub fn new(sound: Option<String>) -> Self {
        Self { sound }
    }

    /// Decide whether `transition` produces a notification.
    pub fn evaluate(
        &self,
        transition: &Transition,
        enabled: bool,
        ledger: &mut NotificationLedger,
        now: DateTime<Utc>,
    ) -> Option<Notification> {
        let to = transition.to?;

        let entered_ready = to == Status::ReadyForInput
            && !transition.is_appearance()
            && transition.from != Some(Status::ReadyForInput);

        if !entered_ready {
            if ledger
                .get(&transition.id)
                .is_some_and(|record| record.status != to)
            {
                ledger.clear(&transition.id);
            }
            return None;
        }

        if !enabled {
            tracing::debug!(id = %transition.id, "notifications disabled, suppressing");
            return None;
        }

        if ledger
            .get(&transition.id)
            .is_some_and(|record| record.status == Status::ReadyForInput)
        {
            return None;
        }

        ledger.record(&transition.id, Status::ReadyForInput, now);
        Some(self.needs_input(transition))
    }

    pub fn test_notification(&self) -> Notification {
        Notification::test(self.sound.clone())
    }

    fn needs_input(&self, transition: &Transition) -> Notification {
        let name = transition
            .slug
            .as_deref()
            .unwrap_or(&transition.display_name);
        Notification {
            title: NEEDS_INPUT_TITLE.to_string(),
            body: format!("{}: {}", transition.display_name, name),
            sound: self.sound.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transition(from: Option<Status>, to: Option<Status>) -> Transition {
        Transition {
            id: "s1".into(),
            display_name: "api".into(),
            slug: Some("fix-login".into()),
            from,
            to,
        }
    }

    #[test]
    fn fires_on_processing_to_ready() {
        let d = NotificationDispatcher::new(Some("Glass".into()));
        let mut ledger = NotificationLedger::default();
        let n = d
            .evaluate(
                &transition(Some(Status::Processing), Some(Status::ReadyForInput)),
                true,
                &mut ledger,
                Utc::now(),
            )
            .expect("should fire");
        assert_eq!(n.title, NEEDS_INPUT_TITLE);
        assert_eq!(n.body, "api: fix-login");
        assert_eq!(n.sound.as_deref(), Some("Glass"));
        assert_eq!(ledger.get("s1").map(|r| r.status), Some(Status::ReadyForInput));
    }

    #[test]
    fn body_falls_back_to_project_name() {
        let d = NotificationDispatcher::default();
        let mut ledger = NotificationLedger::default();
        let mut t = transition(Some(Status::Processing), Some(Status::ReadyForInput));
        t.slug = None;
        let n = d.evaluate(&t, true, &mut ledger, Utc::now()).unwrap();
        assert_eq!(n.body, "api: api");
    }

    #[test]
    fn appearance_never_fires() {
        let d = NotificationDispatcher::default();
        let mut ledger = NotificationLedger::default();
        assert!(d
            .evaluate(&transition(None, Some(Status::ReadyForInput)), true, &mut ledger, Utc::now())
            .is_none());
        assert!(ledger.is_empty());
    }

    #[test]
    fn outstanding_record_blocks_refire() {
        let d = NotificationDispatcher::default();
        let mut ledger = NotificationLedger::default();
        let t = transition(Some(Status::Waiting), Some(Status::ReadyForInput));
        assert!(d.evaluate(&t, true, &mut ledger, Utc::now()).is_some());
        assert!(d.evaluate(&t, true, &mut ledger, Utc::now()).is_none());
    }

    #[test]
    fn leaving_ready_clears_the_record() {
        let d = NotificationDispatcher::default();
        let mut ledger = NotificationLedger::default();
        let now = Utc::now();
        d.evaluate(
            &transition(Some(Status::Processing), Some(Status::ReadyForInput)),
            true,
            &mut ledger,
            now,
        );
        d.evaluate(
            &transition(Some(Status::ReadyForInput), Some(Status::Processing)),
            true,
            &mut ledger,
            now,
        );
        assert!(ledger.get("s1").is_none());
        assert!(d
            .evaluate(
                &transition(Some(Status::Processing), Some(Status::ReadyForInput)),
                true,
                &mut ledger,
                now,
            )
            .is_some());
    }

    #[test]
    fn disabled_suppresses_without_recording() {
        let d = NotificationDispatcher::default();
        let mut ledger = NotificationLedger::default();
        let t = transition(Some(Status::Processing), Some(Status::ReadyForInput));
        assert!(d.evaluate(&t, false, &mut ledger, Utc::now()).is_none());
        assert!(ledger.is_empty());
    }
}
