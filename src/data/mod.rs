use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Classified state of a tracked session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Processing,
    ReadyForInput,
    Waiting,
    Unknown,
}

impl Status {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Processing => "Processing",
            Self::ReadyForInput => "Ready",
            Self::Waiting => "Waiting",
            Self::Unknown => "Unknown",
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::Processing,
            Self::ReadyForInput,
            Self::Waiting,
            Self::Unknown,
        ]
        .into_iter()
    }
}

/// Parsed form of the free-text activity marker a session source reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// Active generation or tool use
    Processing,
    /// Assistant produced output and the user has not answered
    AwaitingInput,
    /// Session is open but nothing is pending on either side
    Idle,
    /// Anything the classifier does not recognize
    Other(String),
}

impl Marker {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "processing" | "running" | "busy" => Self::Processing,
            "awaiting_input" | "ready" => Self::AwaitingInput,
            "idle" => Self::Idle,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Processing => "processing",
            Self::AwaitingInput => "awaiting_input",
            Self::Idle => "idle",
            Self::Other(s) => s,
        }
    }
}

/// One session as reported by a [`SessionSource`](crate::integrations::SessionSource),
/// before any judgment is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Stable id (the transcript file stem for Claude Code)
    pub id: String,
    /// Project name shown in the dashboard; may repeat across ids
    pub display_name: String,
    pub marker: String,
    pub started_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    /// Human-friendly session label, used in notification bodies
    #[serde(default)]
    pub slug: Option<String>,
    /// Process the session is attached to, if the source knows it
    #[serde(default)]
    pub pid: Option<u32>,
}

impl RawRecord {
    /// A record the source could not fully read.
    pub fn is_malformed(&self) -> bool {
        self.display_name.trim().is_empty() || self.last_activity.is_none()
    }

    pub fn marker(&self) -> Marker {
        Marker::parse(&self.marker)
    }
}

/// Current registry state for one session id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: String,
    pub display_name: String,
    pub slug: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_activity: Option<DateTime<Utc>>,
    pub marker: String,
    pub status: Status,
}

impl Session {
    pub fn from_record(record: RawRecord, status: Status) -> Self {
        Self {
            id: record.id,
            display_name: record.display_name,
            slug: record.slug,
            started_at: record.started_at,
            last_activity: record.last_activity,
            marker: record.marker,
            status,
        }
    }
}

/// Unit handed to the presenter. Never mutated after a scan emits it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotEntry {
    pub session: Session,
    pub status: Status,
    /// Time since the session started, measured at scan time
    pub elapsed: Duration,
}

impl SnapshotEntry {
    pub fn format_elapsed(&self) -> String {
        format_duration(self.elapsed)
    }
}

/// Change in one session's status between two consecutive scans.
///
/// `from == None` is an appearance, `to == None` a disappearance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub display_name: String,
    pub slug: Option<String>,
    pub from: Option<Status>,
    pub to: Option<Status>,
}

impl Transition {
    pub fn is_appearance(&self) -> bool {
        self.from.is_none()
    }

    pub fn is_disappearance(&self) -> bool {
        self.to.is_none()
    }
}

/// Title/body/sound triple handed to a notifier sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub sound: Option<String>,
}

impl Notification {
    /// Fixed notification fired by the test key, bypassing every policy.
    pub fn test(sound: Option<String>) -> Self {
        Self {
            title: "Claude Glasses".to_string(),
            body: "Notifications are working!".to_string(),
            sound,
        }
    }
}

/// Format as `1h 5m` or `4m 12s`.
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m {}s", minutes, secs)
    }
}
