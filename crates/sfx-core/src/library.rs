use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::clip::{Clip, DEFAULT_VOLUME};

#[derive(Debug, Error)]
#[error("cannot read audio directory {}: {source}", .dir.display())]
pub struct ScanError {
    pub dir: PathBuf,
    #[source]
    pub source: std::io::Error,
}

pub fn is_playable_audio_path(path: &Path) -> bool {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase());
    matches!(
        ext.as_deref(),
        Some("mp3" | "flac" | "ogg" | "opus" | "m4a" | "aac" | "wav" | "aiff" | "wv" | "ape")
    )
}

/// One clip per playable file directly inside `dir`, named by file name and
/// sorted by name so menu indices stay stable between runs.
pub fn scan_clips(dir: &Path, default_play_odds: u32) -> Result<Vec<Arc<Clip>>, ScanError> {
    let rd = std::fs::read_dir(dir).map_err(|source| ScanError {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<(String, PathBuf)> = rd
        .filter_map(|entry| {
            let entry = entry.ok()?;
            let path = entry.path();
            if !path.is_file() || !is_playable_audio_path(&path) {
                return None;
            }
            let name = path.file_name()?.to_string_lossy().to_string();
            Some((name, path))
        })
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));

    debug!("found {} clips in {:?}", files.len(), dir);
    Ok(files
        .into_iter()
        .map(|(name, path)| {
            Arc::new(Clip::with_settings(
                name,
                path,
                default_play_odds,
                DEFAULT_VOLUME,
            ))
        })
        .collect())
}
