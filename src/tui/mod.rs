pub mod input;
mod message;
pub mod ui;

use crate::config::Config;
use crate::data::Notification;
use crate::engine::{Effect, LoopEvent, ScanLoop};
use crate::error::{NotifierError, SourceError};
use crate::integrations::notifier::NotifierSink;
use crate::integrations::SessionSource;
use crate::util::send_or_log;
use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub use message::Message;
pub use ui::{Presenter, TerminalPresenter};

/// Bound on queued events; producers wait when the loop falls behind.
const EVENT_QUEUE_DEPTH: usize = 64;

/// Tick periods for the loop.
#[derive(Debug, Clone, Copy)]
pub struct Tickers {
    pub scan: Duration,
    pub animation: Duration,
}

impl Tickers {
    pub fn from_config(config: &Config) -> Self {
        Self {
            scan: config.scan.scan_interval(),
            animation: config.scan.animation_interval(),
        }
    }
}

pub async fn run(
    config: Config,
    source: Arc<dyn SessionSource>,
    notifier: Arc<dyn NotifierSink>,
) -> Result<()> {
    if !std::io::IsTerminal::is_terminal(&io::stdout()) {
        anyhow::bail!("claude-glasses requires an interactive terminal");
    }

    // Setup terminal
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut presenter = TerminalPresenter::new(Terminal::new(backend)?);

    let scan_loop = ScanLoop::from_config(&config);
    let tickers = Tickers::from_config(&config);
    tracing::info!(
        source = source.name(),
        scan_ms = tickers.scan.as_millis() as u64,
        notifications = config.notifications.enabled,
        "dashboard starting"
    );

    let (tx, rx) = mpsc::channel(EVENT_QUEUE_DEPTH);
    let stop = Arc::new(AtomicBool::new(false));
    let reader = input::spawn_reader(tx.clone(), Arc::clone(&stop));

    let result = run_loop(scan_loop, tickers, source, notifier, &mut presenter, tx, rx).await;

    stop.store(true, Ordering::Relaxed);

    // Restore terminal
    disable_raw_mode()?;
    execute!(presenter.terminal_mut().backend_mut(), LeaveAlternateScreen)?;
    presenter.terminal_mut().show_cursor()?;

    if reader.join().is_err() {
        tracing::warn!("keyboard reader panicked");
    }
    tracing::info!("dashboard stopped");

    result
}

/// Drive `scan_loop` until it asks to quit.
///
/// Events from the tickers, the keyboard reader and finished background work
/// are handled strictly in arrival order. Scans and notifications run on the
/// blocking pool and report back through `tx`.
pub async fn run_loop<P: Presenter>(
    mut scan_loop: ScanLoop,
    tickers: Tickers,
    source: Arc<dyn SessionSource>,
    notifier: Arc<dyn NotifierSink>,
    presenter: &mut P,
    tx: mpsc::Sender<LoopEvent>,
    mut rx: mpsc::Receiver<LoopEvent>,
) -> Result<()> {
    let ticker_tasks = [
        spawn_ticker(tx.clone(), tickers.scan, || LoopEvent::ScanTick, "scan tick"),
        spawn_ticker(
            tx.clone(),
            tickers.animation,
            || LoopEvent::AnimationTick,
            "animation tick",
        ),
    ];

    presenter.present(&scan_loop.view())?;

    let mut result = Ok(());
    'events: while let Some(event) = rx.recv().await {
        let mut redraw = false;
        for effect in scan_loop.handle(event, Utc::now()) {
            match effect {
                Effect::StartScan => spawn_scan(Arc::clone(&source), tx.clone()),
                Effect::Notify(notification) => {
                    spawn_notify(Arc::clone(&notifier), notification, tx.clone())
                }
                Effect::Present => redraw = true,
                Effect::Quit => break 'events,
            }
        }
        if redraw {
            if let Err(e) = presenter.present(&scan_loop.view()) {
                result = Err(e.context("failed to draw dashboard"));
                break;
            }
        }
    }

    for task in ticker_tasks {
        task.abort();
    }
    result
}

fn spawn_ticker(
    tx: mpsc::Sender<LoopEvent>,
    period: Duration,
    event: fn() -> LoopEvent,
    context: &'static str,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if !send_or_log(&tx, event(), context).await {
                break;
            }
        }
    })
}

fn spawn_scan(source: Arc<dyn SessionSource>, tx: mpsc::Sender<LoopEvent>) {
    tokio::spawn(async move {
        let result = match tokio::task::spawn_blocking(move || source.list()).await {
            Ok(result) => result,
            Err(e) => Err(SourceError::Aborted(e.to_string())),
        };
        send_or_log(&tx, LoopEvent::ScanFinished(result), "scan result").await;
    });
}

fn spawn_notify(
    notifier: Arc<dyn NotifierSink>,
    notification: Notification,
    tx: mpsc::Sender<LoopEvent>,
) {
    tokio::spawn(async move {
        let result = match tokio::task::spawn_blocking(move || notifier.deliver(&notification)).await
        {
            Ok(result) => result,
            Err(e) => Err(NotifierError::Backend(format!("notifier task failed: {}", e))),
        };
        send_or_log(&tx, LoopEvent::NotifierFinished(result), "notifier result").await;
    });
}
