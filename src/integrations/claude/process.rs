//! Running `claude` processes, keyed by working directory.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use sysinfo::{Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

const CLAUDE_BINARY: &str = "claude";

/// Source of the live process table.
pub trait ProcessTable: Send + Sync {
    /// Working directory → pid for every running `claude` process.
    fn claude_processes(&self) -> HashMap<PathBuf, u32>;
}

/// Process table read through `sysinfo`.
pub struct SystemProcessTable {
    system: Mutex<System>,
}

impl SystemProcessTable {
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SystemProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTable for SystemProcessTable {
    fn claude_processes(&self) -> HashMap<PathBuf, u32> {
        let mut system = match self.system.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                tracing::warn!("process table lock poisoned, reusing last state");
                poisoned.into_inner()
            }
        };

        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cmd(UpdateKind::OnlyIfNotSet)
                .with_cwd(UpdateKind::OnlyIfNotSet),
        );

        let mut found = HashMap::new();
        for (pid, process) in system.processes() {
            // Linux lists threads as tasks of their parent
            if process.thread_kind().is_some() || !is_claude(process) {
                continue;
            }
            if let Some(cwd) = process.cwd() {
                found.insert(cwd.to_path_buf(), pid.as_u32());
            }
        }
        found
    }
}

fn is_claude(process: &Process) -> bool {
    if process.name() == OsStr::new(CLAUDE_BINARY) {
        return true;
    }
    process
        .cmd()
        .first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .is_some_and(|name| name == OsStr::new(CLAUDE_BINARY))
}

/// Fixed process table, for tests and offline replays.
#[derive(Debug, Clone, Default)]
pub struct StaticProcessTable {
    processes: HashMap<PathBuf, u32>,
}

impl StaticProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, cwd: impl Into<PathBuf>, pid: u32) -> Self {
        self.processes.insert(cwd.into(), pid);
        self
    }
}

impl ProcessTable for StaticProcessTable {
    fn claude_processes(&self) -> HashMap<PathBuf, u32> {
        self.processes.clone()
    }
}
