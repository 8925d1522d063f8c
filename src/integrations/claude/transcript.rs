//! Claude Code transcript (`<session-id>.jsonl`) summarizing
//!
//! Only the fields needed for discovery and status classification are read:
//! message type, timestamp, `slug` and `cwd`. Message content is never
//! inspected.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Who sent the last user/assistant line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    /// Includes tool results, which Claude Code logs as user lines
    User,
    Assistant,
}

#[derive(Debug, Deserialize)]
struct TranscriptLine {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    timestamp: Option<Value>,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    cwd: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranscriptSummary {
    pub message_count: usize,
    pub first_message_at: Option<DateTime<Utc>>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub last_speaker: Option<Speaker>,
    pub slug: Option<String>,
    pub cwd: Option<String>,
}

/// Summarize a transcript stream. Lines that are not JSON objects are skipped.
pub fn summarize<R: BufRead>(reader: R) -> std::io::Result<TranscriptSummary> {
    let mut summary = TranscriptSummary::default();

    for line in reader.split(b'\n') {
        let line = line?;
        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }
        let Ok(parsed) = serde_json::from_slice::<TranscriptLine>(&line) else {
            continue;
        };

        if let Some(slug) = parsed.slug.filter(|s| !s.is_empty()) {
            summary.slug = Some(slug);
        }
        if let Some(cwd) = parsed.cwd.filter(|s| !s.is_empty()) {
            summary.cwd = Some(cwd);
        }

        let speaker = match parsed.kind.as_deref() {
            Some("user") => Speaker::User,
            Some("assistant") => Speaker::Assistant,
            _ => continue,
        };

        let at = parsed.timestamp.as_ref().and_then(parse_timestamp);
        if summary.message_count == 0 {
            summary.first_message_at = at;
        }
        summary.message_count += 1;
        summary.last_speaker = Some(speaker);
        summary.last_message_at = at;
    }

    Ok(summary)
}

pub fn read_transcript(path: &Path) -> std::io::Result<TranscriptSummary> {
    let file = File::open(path)?;
    summarize(BufReader::new(file))
}

/// Parse an RFC 3339 string or an epoch-milliseconds number.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            Utc.timestamp_millis_opt(millis).single()
        }
        _ => None,
    }
}

/// Turn an encoded project directory name back into a path.
///
/// `-Users-me-projects-app-foo-bar` becomes `/Users/me/projects/app-foo-bar`:
/// everything after a `projects` segment is one dashed name. Without such a
/// segment every dash is a separator.
pub fn decode_project_path(dir_name: &str) -> String {
    let Some(rest) = dir_name.strip_prefix('-') else {
        return dir_name.to_string();
    };

    let parts: Vec<&str> = rest.split('-').collect();
    if let Some(idx) = parts.iter().position(|p| *p == "projects") {
        if idx + 1 < parts.len() {
            return format!(
                "/{}/{}",
                parts[..=idx].join("/"),
                parts[idx + 1..].join("-")
            );
        }
    }

    format!("/{}", rest.replace('-', "/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_projects_marker() {
        assert_eq!(
            decode_project_path("-Users-rock-projects-app-foo-bar"),
            "/Users/rock/projects/app-foo-bar"
        );
    }

    #[test]
    fn decodes_without_marker() {
        assert_eq!(decode_project_path("-home-dev-work"), "/home/dev/work");
        assert_eq!(decode_project_path("-home-projects"), "/home/projects");
        assert_eq!(decode_project_path("plain"), "plain");
    }

    #[test]
    fn timestamps_from_strings_and_millis() {
        let expected = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(parse_timestamp(&json!("2025-01-02T03:04:05Z")), Some(expected));
        assert_eq!(
            parse_timestamp(&json!(expected.timestamp_millis())),
            Some(expected)
        );
        assert_eq!(parse_timestamp(&json!("yesterday")), None);
        assert_eq!(parse_timestamp(&json!(null)), None);
    }

    #[test]
    fn skips_garbage_lines() {
        let input = b"not json\n{\"type\":\"user\",\"timestamp\":\"2025-01-02T03:04:05Z\"}\n\xff\xfe\n";
        let summary = summarize(&input[..]).unwrap();
        assert_eq!(summary.message_count, 1);
        assert_eq!(summary.last_speaker, Some(Speaker::User));
    }
}
