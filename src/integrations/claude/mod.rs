//! Claude Code session discovery
//!
//! Layout read:
//!
//! ```text
//! ~/.claude/
//! ├── projects/
//! │   └── -Users-me-projects-api/      <- encoded project path
//! │       ├── <session-id>.jsonl       <- one transcript per session
//! │       └── agent-<id>.jsonl         <- sub-agent logs, ignored
//! └── debug/
//!     └── <session-id>.txt             <- written during API calls
//! ```
//!
//! A transcript is an active session when a running `claude` process sits in
//! its project directory. Several transcripts can share a directory; the most
//! recently active one belongs to the process.

pub mod process;
pub mod transcript;

use self::process::{ProcessTable, SystemProcessTable};
use self::transcript::{read_transcript, Speaker, TranscriptSummary};
use super::SessionSource;
use crate::config::SourceConfig;
use crate::data::RawRecord;
use crate::error::SourceError;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

pub const MARKER_PROCESSING: &str = "processing";
pub const MARKER_AWAITING_INPUT: &str = "awaiting_input";
pub const MARKER_IDLE: &str = "idle";

/// Cached transcript summary, valid while the file's mtime and size hold.
#[derive(Debug, Clone)]
struct CachedSummary {
    modified: SystemTime,
    len: u64,
    summary: TranscriptSummary,
}

/// A transcript that matched a live process, before de-duplication.
struct Candidate {
    pid: u32,
    record: RawRecord,
}

pub struct ClaudeCodeSource {
    claude_dir: PathBuf,
    max_age: Duration,
    busy_window: Duration,
    processes: Box<dyn ProcessTable>,
    cache: Mutex<HashMap<PathBuf, CachedSummary>>,
}

impl ClaudeCodeSource {
    pub fn new(claude_dir: PathBuf, config: &SourceConfig) -> Self {
        Self::with_processes(claude_dir, config, Box::new(SystemProcessTable::new()))
    }

    pub fn from_config(config: &SourceConfig) -> Result<Self, SourceError> {
        Ok(Self::new(config.claude_dir()?, config))
    }

    pub fn with_processes(
        claude_dir: PathBuf,
        config: &SourceConfig,
        processes: Box<dyn ProcessTable>,
    ) -> Self {
        Self {
            claude_dir,
            max_age: config.max_age(),
            busy_window: config.busy_window(),
            processes,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn projects_dir(&self) -> PathBuf {
        self.claude_dir.join("projects")
    }

    fn debug_log_path(&self, session_id: &str) -> PathBuf {
        self.claude_dir.join("debug").join(format!("{}.txt", session_id))
    }

    fn is_fresh(&self, modified: Option<SystemTime>, now: SystemTime) -> bool {
        // Future mtimes (clock skew) count as fresh
        modified.is_some_and(|m| now.duration_since(m).unwrap_or_default() < self.busy_window)
    }

    /// Summary for `path`, re-reading only when the file changed.
    fn summary_for(
        &self,
        path: &Path,
        modified: SystemTime,
        len: u64,
        cache: &mut HashMap<PathBuf, CachedSummary>,
    ) -> std::io::Result<TranscriptSummary> {
        if let Some(hit) = cache.get(path) {
            if hit.modified == modified && hit.len == len {
                return Ok(hit.summary.clone());
            }
        }
        let summary = read_transcript(path)?;
        cache.insert(
            path.to_path_buf(),
            CachedSummary {
                modified,
                len,
                summary: summary.clone(),
            },
        );
        Ok(summary)
    }

    fn activity_marker(
        &self,
        summary: &TranscriptSummary,
        session_id: &str,
        modified: SystemTime,
        now: SystemTime,
    ) -> &'static str {
        if self.is_fresh(Some(modified), now) {
            return MARKER_PROCESSING;
        }
        let debug_modified = fs::metadata(self.debug_log_path(session_id))
            .and_then(|m| m.modified())
            .ok();
        if self.is_fresh(debug_modified, now) {
            return MARKER_PROCESSING;
        }
        match summary.last_speaker {
            Some(Speaker::User) => MARKER_PROCESSING,
            Some(Speaker::Assistant) => MARKER_AWAITING_INPUT,
            None => MARKER_IDLE,
        }
    }
}

impl SessionSource for ClaudeCodeSource {
    fn name(&self) -> &str {
        "claude-code"
    }

    fn list(&self) -> Result<Vec<RawRecord>, SourceError> {
        let projects_dir = self.projects_dir();
        let project_entries =
            fs::read_dir(&projects_dir).map_err(|e| SourceError::unavailable(&projects_dir, e))?;

        let running = self.processes.claude_processes();
        let now = SystemTime::now();

        let mut cache = match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut candidates = Vec::new();

        for project in project_entries.flatten() {
            let project_path = project.path();
            if !project_path.is_dir() {
                continue;
            }
            let dir_name = project.file_name().to_string_lossy().to_string();
            let decoded = transcript::decode_project_path(&dir_name);

            let Ok(files) = fs::read_dir(&project_path) else {
                continue;
            };

            for file in files.flatten() {
                let path = file.path();
                if path.extension().and_then(|e| e.to_str()) != Some("jsonl") {
                    continue;
                }
                let Some(session_id) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                if session_id.starts_with("agent-") {
                    continue;
                }

                let Ok(metadata) = file.metadata() else {
                    continue;
                };
                let Ok(modified) = metadata.modified() else {
                    continue;
                };
                if now.duration_since(modified).unwrap_or_default() > self.max_age {
                    continue;
                }
                seen.insert(path.clone());

                let candidate = match self.summary_for(&path, modified, metadata.len(), &mut cache) {
                    Ok(summary) => {
                        let pid = summary
                            .cwd
                            .as_deref()
                            .and_then(|cwd| running.get(Path::new(cwd)))
                            .or_else(|| running.get(Path::new(&decoded)));
                        let Some(&pid) = pid else {
                            continue;
                        };
                        let marker = self.activity_marker(&summary, session_id, modified, now);
                        Candidate {
                            pid,
                            record: build_record(
                                session_id, &decoded, &dir_name, summary, modified, marker, pid,
                            ),
                        }
                    }
                    Err(e) => {
                        tracing::debug!("unreadable transcript {}: {}", path.display(), e);
                        let Some(&pid) = running.get(Path::new(&decoded)) else {
                            continue;
                        };
                        Candidate {
                            pid,
                            record: RawRecord {
                                id: session_id.to_string(),
                                display_name: display_name(None, &decoded, &dir_name),
                                marker: String::new(),
                                started_at: None,
                                last_activity: None,
                                slug: None,
                                pid: Some(pid),
                            },
                        }
                    }
                };
                candidates.push(candidate);
            }
        }

        cache.retain(|path, _| seen.contains(path));
        drop(cache);

        Ok(one_per_process(candidates))
    }
}

fn build_record(
    session_id: &str,
    decoded: &str,
    dir_name: &str,
    summary: TranscriptSummary,
    modified: SystemTime,
    marker: &str,
    pid: u32,
) -> RawRecord {
    let file_time: DateTime<Utc> = modified.into();
    let last_activity = summary.last_message_at.unwrap_or(file_time);
    let started_at = summary.first_message_at.unwrap_or(last_activity);

    RawRecord {
        id: session_id.to_string(),
        display_name: display_name(summary.cwd.as_deref(), decoded, dir_name),
        marker: marker.to_string(),
        started_at: Some(started_at),
        last_activity: Some(last_activity),
        slug: summary.slug,
        pid: Some(pid),
    }
}

/// Project name: last component of `cwd`, else of the decoded path.
fn display_name(cwd: Option<&str>, decoded: &str, dir_name: &str) -> String {
    cwd.or(Some(decoded))
        .and_then(|p| Path::new(p).file_name())
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| dir_name.to_string())
}

/// Keep the most recently active transcript for each process.
fn one_per_process(mut candidates: Vec<Candidate>) -> Vec<RawRecord> {
    candidates.sort_by(|a, b| {
        b.record
            .last_activity
            .cmp(&a.record.last_activity)
            .then_with(|| a.record.id.cmp(&b.record.id))
    });

    let mut seen_pids = HashSet::new();
    candidates
        .into_iter()
        .filter(|c| seen_pids.insert(c.pid))
        .map(|c| c.record)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_prefers_cwd() {
        assert_eq!(
            display_name(Some("/work/my.app"), "/Users/me/projects/other", "-x"),
            "my.app"
        );
        assert_eq!(display_name(None, "/Users/me/projects/other", "-x"), "other");
    }

    #[test]
    fn newest_transcript_wins_per_process() {
        let now = Utc::now();
        let make = |id: &str, pid: u32, age: i64| Candidate {
            pid,
            record: RawRecord {
                id: id.into(),
                display_name: "p".into(),
                marker: MARKER_IDLE.into(),
                started_at: None,
                last_activity: Some(now - chrono::Duration::seconds(age)),
                slug: None,
                pid: Some(pid),
            },
        };
        let kept = one_per_process(vec![make("old", 1, 500), make("new", 1, 5), make("other", 2, 50)]);
        let ids: Vec<_> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["new", "other"]);
    }
}
