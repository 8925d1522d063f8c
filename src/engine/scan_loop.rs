//! Scan loop state machine.
//!
//! Every event (scan tick, animation tick, key press, background task
//! completion) arrives through one ordered queue and is handled here on the
//! control thread. `handle` never does I/O: it mutates the engine state and
//! returns the [`Effect`]s the runtime must carry out.

use super::classifier::StatusClassifier;
use super::dispatcher::NotificationDispatcher;
use super::registry::SessionRegistry;
use crate::config::Config;
use crate::data::{Notification, RawRecord, SnapshotEntry};
use crate::error::{NotifierError, SourceError};
use crate::tui::Message;
use chrono::{DateTime, Utc};
use tracing::Level;

/// Braille spinner frames for sessions that are processing
pub const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

const PHASE_FRAMES: u8 = 20;

/// Animation position, advanced only by animation ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AnimationPhase {
    frame: u8,
}

impl AnimationPhase {
    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % PHASE_FRAMES;
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[(self.frame / 2) as usize % SPINNER_FRAMES.len()]
    }

    /// On/off pulse for sessions waiting on the user, half a cycle each.
    pub fn pulse_on(&self) -> bool {
        self.frame % 10 < 5
    }
}

/// Level for the `streak`-th consecutive unavailable scan: an outage is
/// reported once when it starts, then only at debug.
pub fn outage_log_level(streak: u32) -> Level {
    if streak <= 1 {
        Level::WARN
    } else {
        Level::DEBUG
    }
}

/// Inputs to the loop.
#[derive(Debug)]
pub enum LoopEvent {
    ScanTick,
    AnimationTick,
    /// Terminal resized; redraw without advancing the animation
    Resize,
    Input(Message),
    ScanFinished(Result<Vec<RawRecord>, SourceError>),
    NotifierFinished(Result<(), NotifierError>),
}

/// Work the runtime performs on behalf of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// List the session source off the control thread
    StartScan,
    /// Deliver a notification off the control thread
    Notify(Notification),
    /// Hand the current snapshot to the presenter
    Present,
    /// Stop the loop
    Quit,
}

/// Mutable state shared by the components, owned by the loop.
#[derive(Debug)]
pub struct EngineState {
    pub registry: SessionRegistry,
    pub notifications_enabled: bool,
    pub scan_in_flight: bool,
    pub snapshot: Vec<SnapshotEntry>,
    pub phase: AnimationPhase,
    pub notifier_failure: Option<String>,
    pub last_scan: Option<DateTime<Utc>>,
    pub quitting: bool,
}

impl EngineState {
    pub fn new(registry: SessionRegistry, notifications_enabled: bool) -> Self {
        Self {
            registry,
            notifications_enabled,
            scan_in_flight: false,
            snapshot: Vec::new(),
            phase: AnimationPhase::default(),
            notifier_failure: None,
            last_scan: None,
            quitting: false,
        }
    }
}

/// Borrowed view handed to the presenter.
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub entries: &'a [SnapshotEntry],
    pub phase: AnimationPhase,
    pub notifications_enabled: bool,
    pub notifier_failure: Option<&'a str>,
    pub source_unavailable: bool,
    pub scanned: bool,
}

#[derive(Debug)]
pub struct ScanLoop {
    state: EngineState,
    classifier: StatusClassifier,
    dispatcher: NotificationDispatcher,
}

impl ScanLoop {
    pub fn new(
        state: EngineState,
        classifier: StatusClassifier,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            state,
            classifier,
            dispatcher,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            EngineState::new(
                SessionRegistry::new(config.scan.unavailable_grace_scans),
                config.notifications.enabled,
            ),
            StatusClassifier::new(config.scan.idle_threshold()),
            NotificationDispatcher::new(config.notifications.sound().map(str::to_string)),
        )
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn view(&self) -> View<'_> {
        View {
            entries: &self.state.snapshot,
            phase: self.state.phase,
            notifications_enabled: self.state.notifications_enabled,
            notifier_failure: self.state.notifier_failure.as_deref(),
            source_unavailable: self.state.registry.unavailable_streak() > 0,
            scanned: self.state.last_scan.is_some(),
        }
    }

    /// Process one event. `now` is the scan timestamp used for idle and
    /// elapsed measurements.
    pub fn handle(&mut self, event: LoopEvent, now: DateTime<Utc>) -> Vec<Effect> {
        if self.state.quitting {
            return Vec::new();
        }

        match event {
            LoopEvent::ScanTick => self.request_scan("tick"),
            LoopEvent::AnimationTick => {
                self.state.phase.advance();
                vec![Effect::Present]
            }
            LoopEvent::Resize => vec![Effect::Present],
            LoopEvent::Input(msg) => self.update(msg),
            LoopEvent::ScanFinished(Ok(records)) => self.on_scan(records, now),
            LoopEvent::ScanFinished(Err(e)) => self.on_source_unavailable(e, now),
            LoopEvent::NotifierFinished(result) => self.on_notifier(result),
        }
    }

    fn update(&mut self, msg: Message) -> Vec<Effect> {
        match msg {
            Message::Quit => {
                tracing::info!("quit requested");
                self.state.quitting = true;
                vec![Effect::Quit]
            }
            Message::ToggleNotifications => {
                self.state.notifications_enabled = !self.state.notifications_enabled;
                tracing::info!(
                    enabled = self.state.notifications_enabled,
                    "notifications toggled"
                );
                vec![Effect::Present]
            }
            Message::Refresh => self.request_scan("forced refresh"),
            Message::TestNotification => {
                vec![Effect::Notify(self.dispatcher.test_notification())]
            }
            Message::None => Vec::new(),
        }
    }

    fn request_scan(&mut self, reason: &str) -> Vec<Effect> {
        if self.state.scan_in_flight {
            tracing::debug!("scan still in flight, skipping {}", reason);
            return Vec::new();
        }
        self.state.scan_in_flight = true;
        vec![Effect::StartScan]
    }

    fn on_scan(&mut self, records: Vec<RawRecord>, now: DateTime<Utc>) -> Vec<Effect> {
        self.state.scan_in_flight = false;

        let streak = self.state.registry.unavailable_streak();
        if streak > 0 {
            tracing::info!(failed_scans = streak, "session source recovered");
        }

        let count = records.len();
        self.state.snapshot = self.state.registry.ingest(records, &self.classifier, now);
        self.state.last_scan = Some(now);

        let mut effects = self.dispatch_transitions(now);
        tracing::debug!(sessions = count, notifications = effects.len(), "scan complete");
        effects.push(Effect::Present);
        effects
    }

    fn on_source_unavailable(&mut self, error: SourceError, now: DateTime<Utc>) -> Vec<Effect> {
        self.state.scan_in_flight = false;

        let streak = self.state.registry.mark_unavailable();
        if outage_log_level(streak) == Level::WARN {
            tracing::warn!("session source unavailable: {}", error);
        } else {
            tracing::debug!(failed_scans = streak, "session source still unavailable");
        }

        let mut effects = self.dispatch_transitions(now);
        if self.state.registry.is_empty() && !self.state.snapshot.is_empty() {
            tracing::info!(failed_scans = streak, "evicting all sessions after grace period");
            self.state.snapshot.clear();
        }
        effects.push(Effect::Present);
        effects
    }

    fn dispatch_transitions(&mut self, now: DateTime<Utc>) -> Vec<Effect> {
        let enabled = self.state.notifications_enabled;
        let mut effects = Vec::new();

        for transition in self.state.registry.diff() {
            tracing::debug!(
                id = %transition.id,
                from = transition.from.map_or("-", |s| s.label()),
                to = transition.to.map_or("-", |s| s.label()),
                "session transition"
            );
            if let Some(notification) = self.dispatcher.evaluate(
                &transition,
                enabled,
                self.state.registry.ledger_mut(),
                now,
            ) {
                tracing::info!(id = %transition.id, name = %transition.display_name, "session needs input");
                effects.push(Effect::Notify(notification));
            }
        }
        effects
    }

    fn on_notifier(&mut self, result: Result<(), NotifierError>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                if self.state.notifier_failure.take().is_some() {
                    tracing::info!("notifier recovered");
                    vec![Effect::Present]
                } else {
                    Vec::new()
                }
            }
            Err(e) => {
                tracing::warn!("notification delivery failed: {}", e);
                self.state.notifier_failure = Some(e.to_string());
                vec![Effect::Present]
            }
        }
    }
}
