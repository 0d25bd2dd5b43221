/// mpv playback backend, one short-lived mpv process per playback.
///
/// ```text
///   MpvBackend::play(path, volume)
///         │
///         ├── spawn `mpv --no-video --no-terminal --volume=N -- path`
///         └── supervisor task
///                 ├── child exits        → PlaybackControl::finish(status)
///                 └── stop requested     → kill child, finish(Ok)
/// ```
///
/// The child is spawned with `kill_on_drop`, so even if the supervisor is
/// torn down with the runtime the process does not outlive us.  `stdin` is
/// null and `--no-terminal` is set so mpv never competes with the menu for
/// keyboard input.
use sfx_core::{Playback, PlaybackError, SoundBackend};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, warn};

pub struct MpvBackend {
    binary: Option<PathBuf>,
}

impl MpvBackend {
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self { binary }
    }

    pub fn binary(&self) -> Option<&Path> {
        self.binary.as_deref()
    }
}

/// mpv takes volume as a percentage.  Clip volumes are not clamped, so the
/// ceiling is raised to mpv's own maximum instead of the default 130.
fn volume_args(volume: f32) -> [String; 2] {
    [
        format!("--volume={}", (volume * 100.0).round() as i64),
        "--volume-max=1000".to_string(),
    ]
}

impl SoundBackend for MpvBackend {
    fn play(&self, path: &Path, volume: f32) -> Result<Playback, PlaybackError> {
        if !path.is_file() {
            return Err(PlaybackError::Missing(path.to_path_buf()));
        }
        let binary = self.binary.as_ref().ok_or(PlaybackError::PlayerNotFound)?;

        let mut child = tokio::process::Command::new(binary)
            .arg("--no-video")
            .arg("--no-terminal")
            .args(volume_args(volume))
            .arg("--")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(PlaybackError::Spawn)?;

        let (playback, mut control) = Playback::channel();
        let label = path.display().to_string();
        debug!("mpv: started pid={:?} for {}", child.id(), label);

        tokio::spawn(async move {
            let outcome = tokio::select! {
                status = child.wait() => Some(status),
                _ = control.stop_requested() => None,
            };

            let result = match outcome {
                Some(Ok(status)) if status.success() => Ok(()),
                Some(Ok(status)) => Err(PlaybackError::Exited(status.to_string())),
                Some(Err(e)) => Err(PlaybackError::Io(e)),
                None => {
                    debug!("mpv: stopping {}", label);
                    if let Err(e) = child.kill().await {
                        warn!("mpv: failed to kill player for {}: {}", label, e);
                    }
                    Ok(())
                }
            };
            control.finish(result);
        });

        Ok(playback)
    }
}
