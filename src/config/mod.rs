use crate::error::SourceError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_SCAN_INTERVAL_MS: u64 = 250;
const MIN_ANIMATION_INTERVAL_MS: u64 = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    #[serde(default = "default_scan_interval")]
    pub interval_ms: u64,
    #[serde(default = "default_animation_interval")]
    pub animation_interval_ms: u64,
    #[serde(default = "default_idle_threshold")]
    pub idle_threshold_secs: u64,
    #[serde(default = "default_grace_scans")]
    pub unavailable_grace_scans: u32,
}

fn default_scan_interval() -> u64 {
    2000
}

fn default_animation_interval() -> u64 {
    100
}

fn default_idle_threshold() -> u64 {
    30
}

fn default_grace_scans() -> u32 {
    10
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_scan_interval(),
            animation_interval_ms: default_animation_interval(),
            idle_threshold_secs: default_idle_threshold(),
            unavailable_grace_scans: default_grace_scans(),
        }
    }
}

impl ScanConfig {
    pub fn scan_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(MIN_SCAN_INTERVAL_MS))
    }

    pub fn animation_interval(&self) -> Duration {
        Duration::from_millis(self.animation_interval_ms.max(MIN_ANIMATION_INTERVAL_MS))
    }

    pub fn idle_threshold(&self) -> Duration {
        Duration::from_secs(self.idle_threshold_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Claude Code data directory; defaults to `~/.claude`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claude_dir: Option<PathBuf>,
    #[serde(default = "default_max_age_hours")]
    pub max_age_hours: u64,
    #[serde(default = "default_busy_window")]
    pub busy_window_secs: u64,
}

fn default_max_age_hours() -> u64 {
    24
}

fn default_busy_window() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            claude_dir: None,
            max_age_hours: default_max_age_hours(),
            busy_window_secs: default_busy_window(),
        }
    }
}

impl SourceConfig {
    /// Resolve the Claude data directory, expanding a leading `~`.
    pub fn claude_dir(&self) -> Result<PathBuf, SourceError> {
        match &self.claude_dir {
            Some(dir) => expand_home(dir),
            None => dirs::home_dir()
                .map(|home| home.join(".claude"))
                .ok_or(SourceError::HomeDirUnknown),
        }
    }

    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_hours.saturating_mul(3600))
    }

    pub fn busy_window(&self) -> Duration {
        Duration::from_secs(self.busy_window_secs)
    }
}

fn expand_home(path: &Path) -> Result<PathBuf, SourceError> {
    match path.strip_prefix("~") {
        Ok(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .ok_or(SourceError::HomeDirUnknown),
        Err(_) => Ok(path.to_path_buf()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether notifications start enabled (the `n` key toggles at runtime)
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Sound name passed to the notifier; empty for silent
    #[serde(default = "default_sound")]
    pub sound: String,
}

fn default_true() -> bool {
    true
}

fn default_sound() -> String {
    "Glass".to_string()
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sound: default_sound(),
        }
    }
}

impl NotificationConfig {
    pub fn sound(&self) -> Option<&str> {
        let sound = self.sound.trim();
        (!sound.is_empty()).then_some(sound)
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("", "", "claude-glasses")
        .context("Could not determine config directory")
}

pub fn config_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().to_path_buf())
}

pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration.
///
/// An explicit `path` must exist. Without one, a missing default file means
/// built-in defaults.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                anyhow::bail!("Config file not found at {}", p.display());
            }
            p.to_path_buf()
        }
        None => {
            let p = default_config_path()?;
            if !p.exists() {
                tracing::info!("no config at {}, using defaults", p.display());
                return Ok(Config::default());
            }
            p
        }
    };

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;

    parse(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// Write the default configuration, asking before overwriting.
pub fn init(path: Option<&Path>) -> Result<()> {
    use std::io::{self, Write};

    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if config_path.exists() {
        print!("Config already exists at {}. Overwrite? [y/N] ", config_path.display());
        io::stdout().flush()?;
        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        if !input.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return Ok(());
        }
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = toml::to_string_pretty(&Config::default())?;
    std::fs::write(&config_path, content)?;

    // Set file permissions to 0600 (Unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&config_path, std::fs::Permissions::from_mode(0o600))?;
    }

    println!("Config saved to {}", config_path.display());
    println!("Run `claude-glasses` to start the dashboard.");

    Ok(())
}
