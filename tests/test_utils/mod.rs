#![allow(dead_code)]
//! Test utilities and fixtures for claude-glasses tests

pub mod claude_env;

use chrono::{DateTime, Duration, Utc};
use claude_glasses::data::RawRecord;

/// Well-formed record that started `age_secs` ago and was last active `idle_secs` ago.
pub fn record_at(
    id: &str,
    marker: &str,
    now: DateTime<Utc>,
    age_secs: i64,
    idle_secs: i64,
) -> RawRecord {
    RawRecord {
        id: id.to_string(),
        display_name: format!("{}-project", id),
        marker: marker.to_string(),
        started_at: Some(now - Duration::seconds(age_secs)),
        last_activity: Some(now - Duration::seconds(idle_secs)),
        slug: None,
        pid: Some(1000),
    }
}

/// Record that was just active.
pub fn record(id: &str, marker: &str, now: DateTime<Utc>) -> RawRecord {
    record_at(id, marker, now, 60, 0)
}

/// Record the source could only partly read.
pub fn malformed_record(id: &str) -> RawRecord {
    RawRecord {
        id: id.to_string(),
        display_name: "broken".to_string(),
        marker: String::new(),
        started_at: None,
        last_activity: None,
        slug: None,
        pid: None,
    }
}
