#![allow(dead_code)]

use sfx_core::{Clip, Playback, PlaybackError, SoundBackend};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TICK: Duration = Duration::from_millis(250);

pub fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

pub fn clip_with_odds(name: &str, odds: u32) -> Arc<Clip> {
    Arc::new(Clip::with_settings(name, format!("sfx/{name}"), odds, 1.0))
}

/// Records every play request.  Playbacks either finish at once, last a
/// fixed (tokio) duration and honour stop requests, or fail to open.
pub struct FakeBackend {
    plays: Mutex<Vec<(PathBuf, f32)>>,
    stops: Arc<AtomicUsize>,
    duration: Option<Duration>,
    fail: bool,
}

impl FakeBackend {
    fn build(duration: Option<Duration>, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            plays: Mutex::new(Vec::new()),
            stops: Arc::new(AtomicUsize::new(0)),
            duration,
            fail,
        })
    }

    pub fn instant() -> Arc<Self> {
        Self::build(None, false)
    }

    pub fn lasting(duration: Duration) -> Arc<Self> {
        Self::build(Some(duration), false)
    }

    pub fn failing() -> Arc<Self> {
        Self::build(None, true)
    }

    pub fn play_count(&self) -> usize {
        self.plays.lock().unwrap().len()
    }

    pub fn volumes(&self) -> Vec<f32> {
        self.plays.lock().unwrap().iter().map(|(_, v)| *v).collect()
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.plays.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

impl SoundBackend for FakeBackend {
    fn play(&self, path: &Path, volume: f32) -> Result<Playback, PlaybackError> {
        self.plays.lock().unwrap().push((path.to_path_buf(), volume));
        if self.fail {
            return Err(PlaybackError::Missing(path.to_path_buf()));
        }

        let (playback, mut control) = Playback::channel();
        match self.duration {
            None => control.finish(Ok(())),
            Some(duration) => {
                let stops = Arc::clone(&self.stops);
                tokio::spawn(async move {
                    let stopped = tokio::select! {
                        _ = tokio::time::sleep(duration) => false,
                        _ = control.stop_requested() => true,
                    };
                    if stopped {
                        stops.fetch_add(1, Ordering::SeqCst);
                    }
                    control.finish(Ok(()));
                });
            }
        }
        Ok(playback)
    }
}
