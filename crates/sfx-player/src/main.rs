mod console;
mod control;
mod mpv;

use anyhow::Context;
use clap::Parser;
use sfx_core::config::Config;
use sfx_core::{library, platform, ConfigStore, Scheduler, StoreError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::console::StdConsole;
use crate::control::ControlLoop;
use crate::mpv::MpvBackend;

#[derive(Parser, Debug)]
#[command(author, version, about = "Randomly play the sound effects in a directory")]
struct Args {
    /// Application config file.
    #[arg(short, long, default_value = Config::FILE_NAME)]
    config: PathBuf,

    /// Directory of audio clips (overrides paths.sfx_dir).
    #[arg(long)]
    sfx_dir: Option<PathBuf>,

    /// Per-clip settings file (overrides paths.settings_file).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// mpv binary (overrides playback.mpv_binary).
    #[arg(long)]
    mpv: Option<PathBuf>,

    /// Polling interval in milliseconds (overrides scheduler.tick_interval_ms).
    #[arg(long)]
    tick_ms: Option<u64>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(dir) = self.sfx_dir {
            config.paths.sfx_dir = dir;
        }
        if let Some(settings) = self.settings {
            config.paths.settings_file = settings;
        }
        if let Some(mpv) = self.mpv {
            config.playback.mpv_binary = Some(mpv);
        }
        if let Some(tick_ms) = self.tick_ms {
            config.scheduler.tick_interval_ms = tick_ms;
        }
    }
}

#[derive(Debug, Error)]
enum StartupError {
    #[error("Directory does not exist: {}", .0.display())]
    MissingSfxDir(PathBuf),
    #[error("Config file does not exist: {}", .0.display())]
    MissingSettingsFile(PathBuf),
}

/// Both paths must exist before anything is spawned or written.
fn check_preconditions(config: &Config) -> Result<(), StartupError> {
    if !config.paths.sfx_dir.is_dir() {
        return Err(StartupError::MissingSfxDir(config.paths.sfx_dir.clone()));
    }
    if !config.paths.settings_file.is_file() {
        return Err(StartupError::MissingSettingsFile(
            config.paths.settings_file.clone(),
        ));
    }
    Ok(())
}

fn init_logging() -> anyhow::Result<PathBuf> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating data dir {}", data_dir.display()))?;
    let log_path = platform::log_path();

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;

    // stdout belongs to the menu, so everything goes to the file.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,sfx_core=debug,sfx_player=debug".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    Ok(log_path)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let mut config = Config::load(&args.config)?;
    args.apply(&mut config);

    check_preconditions(&config)?;

    let log_path = init_logging()?;
    eprintln!("random-sfx log: {}", log_path.display());
    info!("random-sfx starting, config {:?}", config);

    // ── Discover clips ───────────────────────────────────────────────────────
    let clips = library::scan_clips(&config.paths.sfx_dir, config.scheduler.default_play_odds)?;
    if clips.is_empty() {
        println!("No audio files found in {}", config.paths.sfx_dir.display());
        return Ok(());
    }
    info!("found {} clips", clips.len());

    // ── Backend + scheduler ─────────────────────────────────────────────────
    let mpv_binary = config
        .playback
        .mpv_binary
        .clone()
        .or_else(platform::find_mpv_binary);
    let backend = Arc::new(MpvBackend::new(mpv_binary));
    match backend.binary() {
        Some(path) => info!("using mpv at {:?}", path),
        None => warn!("mpv not found; playback attempts will fail until it is installed"),
    }
    let scheduler = Scheduler::new(backend).with_tick(config.scheduler.tick_interval());
    scheduler.activate_all(&clips);

    // ── Persisted settings ───────────────────────────────────────────────────
    let store = ConfigStore::new(config.paths.settings_file.clone());
    match store.load(&clips) {
        Ok(summary) => info!(
            "settings: {} applied, {} malformed, {} unmatched",
            summary.applied, summary.malformed, summary.unmatched
        ),
        Err(StoreError::NotFound(path)) => {
            warn!("settings file not found: {:?}", path);
            println!("Configuration file not found.");
        }
        Err(e) => warn!("failed to load settings: {}", e),
    }

    // ── Interactive menu (blocking stdin) ────────────────────────────────────
    let menu_clips = clips.clone();
    tokio::task::spawn_blocking(move || {
        ControlLoop::new(menu_clips, store, StdConsole::new()).run();
    })
    .await
    .context("control loop panicked")?;

    info!("shutting down");
    scheduler.shutdown(&clips).await;
    Ok(())
}
