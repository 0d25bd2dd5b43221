pub mod backend;
pub mod clip;
pub mod config;
pub mod library;
pub mod platform;
pub mod scheduler;
pub mod store;

pub use backend::{Playback, PlaybackControl, PlaybackError, SoundBackend};
pub use clip::{Clip, DEFAULT_PLAY_ODDS, DEFAULT_VOLUME};
pub use scheduler::Scheduler;
pub use store::{ConfigStore, LoadSummary, StoreError};
