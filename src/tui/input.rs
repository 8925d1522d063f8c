//! Keyboard handling for the Elm Architecture (TEA) loop.
//!
//! Key events are mapped to [`Message`]s here and forwarded into the loop's
//! event queue by a dedicated reader thread.

use super::Message;
use crate::engine::LoopEvent;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long the reader blocks in `poll` before re-checking for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Map a key event to a message.
pub fn dispatch(key: KeyEvent) -> Message {
    // Windows reports both press and release
    if key.kind == KeyEventKind::Release {
        return Message::None;
    }

    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Message::Quit,
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Message::Quit,
        KeyCode::Char('n') | KeyCode::Char('N') => Message::ToggleNotifications,
        KeyCode::Char('r') | KeyCode::Char('R') => Message::Refresh,
        KeyCode::Char('t') | KeyCode::Char('T') => Message::TestNotification,
        _ => Message::None,
    }
}

/// Read the terminal on a blocking thread until `stop` is set or the queue
/// closes.
pub fn spawn_reader(tx: mpsc::Sender<LoopEvent>, stop: Arc<AtomicBool>) -> JoinHandle<()> {
    std::thread::spawn(move || {
        while !stop.load(Ordering::Relaxed) {
            match event::poll(POLL_INTERVAL) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(e) => {
                    tracing::warn!("terminal poll failed: {}", e);
                    break;
                }
            }

            let msg = match event::read() {
                Ok(Event::Key(key)) => dispatch(key),
                Ok(Event::Resize(..)) => {
                    if tx.blocking_send(LoopEvent::Resize).is_err() {
                        break;
                    }
                    continue;
                }
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("terminal read failed: {}", e);
                    break;
                }
            };

            if msg == Message::None {
                continue;
            }
            if tx.blocking_send(LoopEvent::Input(msg)).is_err() {
                break;
            }
        }
        tracing::debug!("keyboard reader stopped");
    })
}
