//! Flat settings file: one `name|play_odds|volume` record per line.
//!
//! The file only ever carries settings for clips that exist on disk; loading
//! updates matching clips in place and never creates new ones.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::clip::Clip;

const FIELD_SEPARATOR: char = '|';

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("settings file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("settings file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One parsed settings line.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: String,
    pub play_odds: u32,
    pub volume: f32,
}

/// What a `load` did, for logging.  Malformed and unmatched lines are never
/// errors.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub applied: usize,
    pub malformed: usize,
    pub unmatched: usize,
}

/// Parse one line.  `None` unless it has exactly three fields, an integer
/// play odds and a finite volume.  Odds below 1 are raised to 1 so the
/// volume still applies.  Names are matched verbatim.
pub fn parse_record(line: &str) -> Option<Record> {
    let line = line.trim_end_matches('\r');
    let parts: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    let [name, odds, volume] = parts.as_slice() else {
        return None;
    };

    let play_odds = odds.trim().parse::<i64>().ok()?.clamp(1, u32::MAX as i64) as u32;
    let volume = volume.trim().parse::<f32>().ok().filter(|v| v.is_finite())?;

    Some(Record {
        name: (*name).to_string(),
        play_odds,
        volume,
    })
}

/// `f32` Display is the shortest string that parses back to the same value,
/// so `save` → `load` reproduces volumes exactly.
pub fn format_record(clip: &Clip) -> String {
    format!(
        "{}{sep}{}{sep}{}",
        clip.name(),
        clip.play_odds(),
        clip.volume(),
        sep = FIELD_SEPARATOR
    )
}

/// Handle on the settings file.  Passed explicitly to whoever needs to load
/// or save.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Rewrite the whole file from `clips`, in order.
    pub fn save(&self, clips: &[Arc<Clip>]) -> Result<(), StoreError> {
        let mut content = String::new();
        for clip in clips {
            content.push_str(&format_record(clip));
            content.push('\n');
        }

        // Write beside the target then rename, so a crash mid-write leaves
        // the previous file intact.
        let tmp_path = self.tmp_path();
        std::fs::write(&tmp_path, content).map_err(|source| StoreError::Io {
            path: tmp_path.clone(),
            source,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!("saved {} clip settings to {:?}", clips.len(), self.path);
        Ok(())
    }

    /// Apply persisted settings onto `clips`.  A missing file is reported as
    /// `StoreError::NotFound` and nothing is touched.
    pub fn load(&self, clips: &[Arc<Clip>]) -> Result<LoadSummary, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::NotFound(self.path.clone()));
        }
        let content = std::fs::read_to_string(&self.path).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })?;

        let summary = apply_records(&content, clips);
        debug!("loaded settings from {:?}: {:?}", self.path, summary);
        Ok(summary)
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Duplicate clip names alias each other: a record updates only the first
/// clip with that name.
pub fn apply_records(content: &str, clips: &[Arc<Clip>]) -> LoadSummary {
    let mut summary = LoadSummary::default();

    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let Some(record) = parse_record(line) else {
            summary.malformed += 1;
            continue;
        };
        match clips.iter().find(|clip| clip.name() == record.name) {
            Some(clip) => {
                clip.set_play_odds(record.play_odds);
                clip.set_volume(record.volume);
                summary.applied += 1;
            }
            None => summary.unmatched += 1,
        }
    }

    summary
}
