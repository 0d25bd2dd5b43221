/// Scheduler: one polling task per clip.
///
/// Each task sleeps for a tick, rolls against the clip's current odds and,
/// on a hit, plays the clip through the shared [`SoundBackend`] and waits for
/// it to finish.  Both waits are raced against the clip's cancellation token,
/// so `deactivate` takes effect within one tick and stops a playback that is
/// already running.
///
/// ```text
///   activate(clip) ──spawn──▶ poll_loop
///                               loop {
///                                 sleep(tick)        ◀─┐
///                                 roll(odds)?          │ select! against
///                                 backend.play(...)    │ cancel.cancelled()
///                                 playback.finished() ◀┘
///                               }
/// ```
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, MutexGuard, PoisonError};
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::backend::SoundBackend;
use crate::clip::{Clip, PollTask};

pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

/// A draw in `[0, 100 * odds)` below 100 is a hit: probability `1 / odds`.
pub fn roll<R: Rng>(rng: &mut R, play_odds: u32) -> bool {
    let range = 100 * u64::from(play_odds.max(1));
    rng.gen_range(0..range) < 100
}

pub struct Scheduler {
    backend: Arc<dyn SoundBackend>,
    tick: Duration,
    live: Arc<AtomicUsize>,
}

impl Scheduler {
    pub fn new(backend: Arc<dyn SoundBackend>) -> Self {
        Self {
            backend,
            tick: DEFAULT_TICK,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    pub fn tick(&self) -> Duration {
        self.tick
    }

    /// Number of polling tasks that have been spawned and not yet exited.
    pub fn live_tasks(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Start polling `clip` unless a task for it is still running.
    /// Must be called from within a tokio runtime.
    pub fn activate(&self, clip: &Arc<Clip>) {
        let mut slot = lock_slot(clip);
        if let Some(task) = slot.as_ref() {
            if !task.handle.is_finished() {
                debug!("{}: already active", clip.name());
                return;
            }
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(poll_loop(
            Arc::clone(clip),
            Arc::clone(&self.backend),
            self.tick,
            cancel.clone(),
            LiveGuard::enter(&self.live),
        ));
        *slot = Some(PollTask { cancel, handle });
        clip.set_active(true);
        debug!("{}: activated", clip.name());
    }

    /// Cancel the clip's polling task, if any.  The task notices within one
    /// tick and stops a playback in progress.
    pub fn deactivate(&self, clip: &Clip) {
        let task = lock_slot(clip).take();
        if let Some(task) = task {
            clip.set_active(false);
            task.cancel.cancel();
            debug!("{}: deactivated", clip.name());
        }
    }

    pub fn activate_all(&self, clips: &[Arc<Clip>]) {
        for clip in clips {
            self.activate(clip);
        }
    }

    pub fn deactivate_all(&self, clips: &[Arc<Clip>]) {
        for clip in clips {
            self.deactivate(clip);
        }
    }

    /// Deactivate every clip and wait for the tasks to wind down, so that any
    /// playback they own has been stopped before returning.
    pub async fn shutdown(&self, clips: &[Arc<Clip>]) {
        let mut handles = Vec::with_capacity(clips.len());
        for clip in clips {
            let task = lock_slot(clip).take();
            if let Some(task) = task {
                clip.set_active(false);
                task.cancel.cancel();
                handles.push((clip.name().to_string(), task.handle));
            }
        }
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                warn!("{}: polling task ended abnormally: {}", name, e);
            }
        }
        info!("scheduler: all polling tasks stopped");
    }
}

fn lock_slot(clip: &Clip) -> MutexGuard<'_, Option<PollTask>> {
    clip.task.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Counts a polling task as live for as long as the task future exists,
/// including when it is aborted or panics.
struct LiveGuard(Arc<AtomicUsize>);

impl LiveGuard {
    fn enter(live: &Arc<AtomicUsize>) -> Self {
        live.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(live))
    }
}

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

async fn poll_loop(
    clip: Arc<Clip>,
    backend: Arc<dyn SoundBackend>,
    tick: Duration,
    cancel: CancellationToken,
    _live: LiveGuard,
) {
    debug!("{}: polling every {:?}", clip.name(), tick);

    loop {
        // Cancellation wins a tie with the tick.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(tick) => {}
        }

        let hit = roll(&mut rand::thread_rng(), clip.play_odds());
        if !hit {
            continue;
        }

        let volume = clip.volume();
        info!("{}: playing at volume {}", clip.name(), volume);
        let mut playback = match backend.play(clip.path(), volume) {
            Ok(p) => p,
            Err(e) => {
                warn!("{}: playback failed: {}", clip.name(), e);
                continue;
            }
        };

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = playback.finished() => Some(result),
        };
        match outcome {
            Some(Ok(())) => debug!("{}: playback finished", clip.name()),
            Some(Err(e)) => warn!("{}: playback failed: {}", clip.name(), e),
            None => {
                playback.stop();
                debug!("{}: playback stopped by cancellation", clip.name());
                break;
            }
        }
    }

    debug!("{}: polling task exiting", clip.name());
}
