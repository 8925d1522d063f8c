//! Temporary `~/.claude` trees for source tests

use claude_glasses::config::SourceConfig;
use serde_json::{json, Value};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// A temporary Claude data directory
pub struct TestClaudeEnv {
    pub temp_dir: TempDir,
    pub claude_dir: PathBuf,
}

impl TestClaudeEnv {
    /// Claude dir with an empty `projects/`
    pub fn new() -> Self {
        let env = Self::without_projects();
        fs::create_dir_all(env.claude_dir.join("projects")).expect("Failed to create projects dir");
        env
    }

    /// Claude dir that has never been used
    pub fn without_projects() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let claude_dir = temp_dir.path().join(".claude");
        fs::create_dir_all(&claude_dir).expect("Failed to create .claude dir");
        Self {
            temp_dir,
            claude_dir,
        }
    }

    /// Source config with a zero busy window, so freshness never forces `processing`
    pub fn quiet_config(&self) -> SourceConfig {
        SourceConfig {
            claude_dir: Some(self.claude_dir.clone()),
            max_age_hours: 24,
            busy_window_secs: 0,
        }
    }

    pub fn config_with_busy_window(&self, secs: u64) -> SourceConfig {
        SourceConfig {
            busy_window_secs: secs,
            ..self.quiet_config()
        }
    }

    /// Write `<projects>/<project>/<session>.jsonl` from JSON lines
    pub fn write_transcript(&self, project: &str, session_id: &str, lines: &[Value]) -> PathBuf {
        let dir = self.claude_dir.join("projects").join(project);
        fs::create_dir_all(&dir).expect("Failed to create project dir");
        let path = dir.join(format!("{}.jsonl", session_id));
        let content: Vec<String> = lines.iter().map(|l| l.to_string()).collect();
        fs::write(&path, content.join("\n") + "\n").expect("Failed to write transcript");
        path
    }

    /// Write `debug/<session>.txt`, which Claude Code touches during API calls
    pub fn touch_debug_log(&self, session_id: &str) {
        let dir = self.claude_dir.join("debug");
        fs::create_dir_all(&dir).expect("Failed to create debug dir");
        fs::write(dir.join(format!("{}.txt", session_id)), "request").expect("Failed to write debug log");
    }
}

/// Push a file's mtime into the past
pub fn age_file(path: &Path, by: Duration) {
    let file = File::options()
        .write(true)
        .open(path)
        .expect("Failed to open file");
    file.set_modified(SystemTime::now() - by)
        .expect("Failed to set mtime");
}

pub fn user_line(cwd: &str, timestamp: &str) -> Value {
    json!({
        "type": "user",
        "cwd": cwd,
        "timestamp": timestamp,
        "message": { "role": "user", "content": "fix the tests" }
    })
}

pub fn assistant_line(cwd: &str, timestamp: &str) -> Value {
    json!({
        "type": "assistant",
        "cwd": cwd,
        "timestamp": timestamp,
        "message": { "role": "assistant", "content": [{ "type": "text", "text": "Done." }] }
    })
}

pub fn summary_line(slug: &str) -> Value {
    json!({ "type": "summary", "slug": slug })
}
