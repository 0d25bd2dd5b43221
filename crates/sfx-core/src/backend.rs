//! Playback seam between the scheduler and whatever renders audio.
//!
//! A backend hands back a [`Playback`] per attempt.  The scheduler awaits
//! [`Playback::finished`] instead of polling a state flag, and a `Playback`
//! that is dropped (cancelled task, early return) tells the backend to stop,
//! so the output device never outlives the attempt.
//!
//! ```text
//!   Scheduler ── play(path, volume) ──▶ SoundBackend
//!       │                                   │
//!       │◀──────── Playback ────────────────┤ PlaybackControl (kept by backend)
//!       │  finished().await  ◀── done ──────┤
//!       │  stop() / drop     ─── stop ─────▶│
//! ```
use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::sync::oneshot;

#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("audio file not found: {0}")]
    Missing(PathBuf),
    #[error("player binary not found")]
    PlayerNotFound,
    #[error("failed to start player: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("player exited unsuccessfully ({0})")]
    Exited(String),
    #[error("player I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("backend dropped the playback without reporting")]
    Abandoned,
}

/// Capability the scheduler needs from an audio output.
pub trait SoundBackend: Send + Sync + 'static {
    /// Acquire the output, set `volume` and start playing `path`.
    /// Must be called from within a tokio runtime.
    fn play(&self, path: &Path, volume: f32) -> Result<Playback, PlaybackError>;
}

/// Scheduler side of one playback attempt.
pub struct Playback {
    done: oneshot::Receiver<Result<(), PlaybackError>>,
    stop: Option<oneshot::Sender<()>>,
}

/// Backend side of one playback attempt.
pub struct PlaybackControl {
    done: oneshot::Sender<Result<(), PlaybackError>>,
    stop: oneshot::Receiver<()>,
}

impl Playback {
    pub fn channel() -> (Playback, PlaybackControl) {
        let (done_tx, done_rx) = oneshot::channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        (
            Playback {
                done: done_rx,
                stop: Some(stop_tx),
            },
            PlaybackControl {
                done: done_tx,
                stop: stop_rx,
            },
        )
    }

    /// Resolves once the backend reports natural completion or failure.
    pub async fn finished(&mut self) -> Result<(), PlaybackError> {
        match (&mut self.done).await {
            Ok(result) => result,
            Err(_) => Err(PlaybackError::Abandoned),
        }
    }

    pub fn stop(&mut self) {
        if let Some(tx) = self.stop.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        self.stop();
    }
}

impl PlaybackControl {
    /// Resolves when the scheduler calls `stop()` or drops its `Playback`.
    pub async fn stop_requested(&mut self) {
        let _ = (&mut self.stop).await;
    }

    pub fn finish(self, result: Result<(), PlaybackError>) {
        let _ = self.done.send(result);
    }
}
