//! Ordered selection tiers over the flattened file list.
//!
//! Tier 1: every video file over the size threshold.
//! Tier 2: the single largest file, if it is over the threshold.
//! Tier 3: everything with an index (only when the permissive fallback is
//! enabled), otherwise `NoEligibleFiles`.

use crate::config::SelectionConfig;
use crate::error::{PandlError, Result};
use crate::resolver::flatten::FlatFileEntry;

/// Extensions considered video content, lowercase, without the dot.
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "ts", "rmvb", "rm", "mpg", "mpeg",
    "m2ts", "iso",
];

/// True when the filename's extension is in the known video set.
pub fn is_video_file(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    match lower.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => VIDEO_EXTENSIONS.contains(&ext),
        _ => false,
    }
}

/// Chosen files and their combined size.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub indices: Vec<String>,
    pub total_size: u64,
    pub names: Vec<String>,
}

impl Selection {
    fn push(&mut self, entry: &FlatFileEntry, index: i64) {
        self.indices.push(index.to_string());
        self.total_size += entry.size;
        self.names.push(entry.name.clone());
    }
}

/// Apply the tier chain; the first non-empty tier wins. Leaves without an
/// index are never selectable regardless of tier.
pub fn select_files(files: &[FlatFileEntry], policy: &SelectionConfig) -> Result<Selection> {
    let mut selection = Selection::default();

    // Tier 1: all sufficiently large videos.
    for entry in files {
        if let Some(index) = entry.file_index {
            if is_video_file(&entry.name) && entry.size > policy.min_file_size {
                selection.push(entry, index);
            }
        }
    }
    if !selection.indices.is_empty() {
        return Ok(selection);
    }

    // Tier 2: single largest file over the threshold.
    let largest = files
        .iter()
        .filter(|e| e.file_index.is_some() && e.size > policy.min_file_size)
        .max_by_key(|e| e.size);
    if let Some(entry) = largest {
        let index = entry.file_index.unwrap_or_default();
        selection.push(entry, index);
        return Ok(selection);
    }

    // Tier 3: take everything, or give up.
    if policy.select_all_fallback {
        for entry in files {
            if let Some(index) = entry.file_index {
                selection.push(entry, index);
            }
        }
        if !selection.indices.is_empty() {
            return Ok(selection);
        }
    }
    Err(PandlError::NoEligibleFiles)
}
