use anyhow::{Context, Result};
use clap::Parser;
use claude_glasses::integrations::claude::ClaudeCodeSource;
use claude_glasses::integrations::notifier::DesktopNotifier;
use claude_glasses::{config, tui, util};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Parser, Debug)]
#[command(name = "claude-glasses")]
#[command(about = "Terminal dashboard that watches Claude Code sessions and alerts when one needs input")]
#[command(version)]
struct Args {
    /// Write the default configuration and exit
    #[arg(long)]
    init: bool,

    /// Path to config file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Start with notifications disabled
    #[arg(long)]
    no_notifications: bool,

    /// Claude Code data directory (default ~/.claude)
    #[arg(long)]
    claude_dir: Option<PathBuf>,

    /// Log file (default: <data dir>/claude-glasses.log)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    // Explicit runtime: a hung notifier must not hold up exit
    util::block_on_detached(run(Args::parse())).context("Failed to start the async runtime")?
}

async fn run(args: Args) -> Result<()> {
    if args.init {
        return config::init(args.config.as_deref());
    }

    let log_path = match args.log_file.clone() {
        Some(path) => Ok(path),
        None => config::data_dir().map(|dir| dir.join("claude-glasses.log")),
    };
    if let Err(e) = log_path.and_then(|path| init_logging(&path)) {
        eprintln!("logging disabled: {:#}", e);
    }

    let mut config = config::load(args.config.as_deref())?;
    if args.no_notifications {
        config.notifications.enabled = false;
    }
    if let Some(dir) = args.claude_dir {
        config.source.claude_dir = Some(dir);
    }

    let source = ClaudeCodeSource::from_config(&config.source)
        .context("Failed to locate the Claude Code data directory")?;
    tracing::info!("watching {}", source.projects_dir().display());

    tui::run(config, Arc::new(source), Arc::new(DesktopNotifier::new())).await
}

/// Log to a file; the dashboard owns the terminal.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("claude_glasses=info".parse()?),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
