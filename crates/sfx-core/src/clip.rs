use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// "1 in 1200" per tick unless the settings file says otherwise.
pub const DEFAULT_PLAY_ODDS: u32 = 1200;
pub const DEFAULT_VOLUME: f32 = 1.0;

/// Running polling task for one clip.  Owned by the clip so that the
/// at-most-one-task invariant lives next to the data it protects.
pub(crate) struct PollTask {
    pub(crate) cancel: CancellationToken,
    pub(crate) handle: JoinHandle<()>,
}

/// One audio file with its play probability and volume.
///
/// `play_odds` and `volume` are shared between the control loop (writer) and
/// the clip's polling task (reader).  Plain relaxed atomics are enough: an
/// edit only has to become visible on some later tick.
pub struct Clip {
    name: String,
    path: PathBuf,
    play_odds: AtomicU32,
    /// f32 bit pattern.
    volume: AtomicU32,
    active: AtomicBool,
    pub(crate) task: Mutex<Option<PollTask>>,
}

impl Clip {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::with_settings(name, path, DEFAULT_PLAY_ODDS, DEFAULT_VOLUME)
    }

    pub fn with_settings(
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        play_odds: u32,
        volume: f32,
    ) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            play_odds: AtomicU32::new(play_odds.max(1)),
            volume: AtomicU32::new(volume.to_bits()),
            active: AtomicBool::new(false),
            task: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn play_odds(&self) -> u32 {
        self.play_odds.load(Ordering::Relaxed)
    }

    /// Zero would make every tick a hit; it is bumped to 1.
    pub fn set_play_odds(&self, odds: u32) {
        self.play_odds.store(odds.max(1), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }

    /// Not clamped: values outside [0, 1] are handed to the backend as-is.
    pub fn set_volume(&self, volume: f32) {
        self.volume.store(volume.to_bits(), Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed)
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.store(active, Ordering::Relaxed);
    }
}

impl std::fmt::Debug for Clip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clip")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("play_odds", &self.play_odds())
            .field("volume", &self.volume())
            .field("active", &self.is_active())
            .finish()
    }
}
