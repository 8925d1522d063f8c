//! Desktop notification delivery.
//!
//! Abstracts over:
//! - **macOS**: `terminal-notifier` when installed, otherwise `osascript`
//!   `display notification`
//! - **Linux / Windows**: the `notify_rust` crate
//!
//! Delivery may block (process spawn, D-Bus round trip), so the scan loop
//! always runs [`NotifierSink::deliver`] on a blocking task and only looks at
//! the result it reports back. Every backend gives up after
//! [`DELIVERY_TIMEOUT`].

use crate::data::Notification;
use crate::error::NotifierError;
use std::process::Child;
use std::time::{Duration, Instant};

pub const APP_NAME: &str = "claude-glasses";

/// Longest a single delivery may take before it is reported as failed.
pub const DELIVERY_TIMEOUT: Duration = Duration::from_secs(5);

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Anything that can show a notification to the user.
pub trait NotifierSink: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), NotifierError>;
}

/// Native desktop notifications for the current platform.
#[derive(Debug, Clone, Copy, Default)]
pub struct DesktopNotifier;

impl DesktopNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotifierSink for DesktopNotifier {
    #[cfg(not(target_os = "macos"))]
    fn deliver(&self, notification: &Notification) -> Result<(), NotifierError> {
        let mut n = notify_rust::Notification::new();
        n.appname(APP_NAME)
            .summary(&notification.title)
            .body(&notification.body);
        if let Some(sound) = notification.sound.as_deref() {
            n.sound_name(sound);
        }

        // `show` can hang on a wedged notification daemon; leave it behind
        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let _ = tx.send(n.show().map(|_| ()).map_err(|e| e.to_string()));
        });
        match rx.recv_timeout(DELIVERY_TIMEOUT) {
            Ok(result) => result.map_err(NotifierError::Backend),
            Err(std::sync::mpsc::RecvTimeoutError::Timeout) => Err(NotifierError::TimedOut {
                program: "notification daemon",
                after: DELIVERY_TIMEOUT,
            }),
            Err(std::sync::mpsc::RecvTimeoutError::Disconnected) => Err(NotifierError::Backend(
                "notification thread exited without a result".to_string(),
            )),
        }
    }

    #[cfg(target_os = "macos")]
    fn deliver(&self, notification: &Notification) -> Result<(), NotifierError> {
        match terminal_notifier(notification) {
            Err(NotifierError::Spawn { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                osascript(notification)
            }
            other => other,
        }
    }
}

#[cfg(target_os = "macos")]
fn terminal_notifier(notification: &Notification) -> Result<(), NotifierError> {
    let mut cmd = std::process::Command::new("terminal-notifier");
    cmd.args(["-title", &notification.title, "-message", &notification.body]);
    if let Some(sound) = notification.sound.as_deref() {
        cmd.args(["-sound", sound]);
    }
    run("terminal-notifier", &mut cmd)
}

#[cfg(target_os = "macos")]
fn osascript(notification: &Notification) -> Result<(), NotifierError> {
    let mut script = format!(
        r#"display notification "{}" with title "{}""#,
        escape_for_applescript(&notification.body),
        escape_for_applescript(&notification.title),
    );
    if let Some(sound) = notification.sound.as_deref() {
        script.push_str(&format!(r#" sound name "{}""#, escape_for_applescript(sound)));
    }
    let mut cmd = std::process::Command::new("osascript");
    cmd.arg("-e").arg(&script);
    run("osascript", &mut cmd)
}

#[cfg(target_os = "macos")]
fn run(program: &'static str, cmd: &mut std::process::Command) -> Result<(), NotifierError> {
    use std::process::Stdio;

    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| NotifierError::Spawn { program, source })?;
    wait_with_timeout(program, child, DELIVERY_TIMEOUT)
}

/// Wait for a notifier process, killing it once `timeout` has passed.
#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
fn wait_with_timeout(
    program: &'static str,
    mut child: Child,
    timeout: Duration,
) -> Result<(), NotifierError> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) if status.success() => return Ok(()),
            Ok(Some(status)) => {
                let mut stderr = String::new();
                if let Some(mut pipe) = child.stderr.take() {
                    let _ = std::io::Read::read_to_string(&mut pipe, &mut stderr);
                }
                return Err(NotifierError::Rejected {
                    program,
                    status: status.to_string(),
                    stderr: stderr.trim().to_string(),
                });
            }
            Ok(None) if Instant::now() >= deadline => {
                tracing::warn!(program, "notifier hung, killing it");
                let _ = child.kill();
                let _ = child.wait();
                return Err(NotifierError::TimedOut {
                    program,
                    after: timeout,
                });
            }
            Ok(None) => std::thread::sleep(POLL_INTERVAL),
            Err(e) => {
                let _ = child.kill();
                return Err(NotifierError::Backend(format!(
                    "waiting for {} failed: {}",
                    program, e
                )));
            }
        }
    }
}

/// Escape a string for embedding inside an AppleScript double-quoted string.
///
/// Backslashes go first so the later replacements are not double-escaped.
pub fn escape_for_applescript(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}
