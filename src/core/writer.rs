// File: src/core/writer.rs
use crate::core::types::Document;
use crate::persistence::save_json;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    /// Files whose content changed (written, or would be under dry-run).
    pub modified: Vec<PathBuf>,
    pub failed: Vec<PathBuf>,
}

/// Writes every rebuilt document that differs from its original. A failed
/// write leaves the file on disk as it was and the batch continues.
pub fn write_changed(originals: &[Document], rebuilt: &[Document], dry_run: bool) -> WriteStats {
    let mut stats = WriteStats::default();

    for (original, updated) in originals.iter().zip(rebuilt) {
        if original.root == updated.root {
            continue;
        }
        if dry_run {
            log::info!("Would update {}", updated.path.display());
            stats.modified.push(updated.path.clone());
            continue;
        }
        match save_json(&updated.path, &updated.root) {
            Ok(()) => {
                log::debug!("Updated {}", updated.path.display());
                stats.modified.push(updated.path.clone());
            }
            Err(e) => {
                log::error!("Failed to write {}: {e}", updated.path.display());
                stats.failed.push(updated.path.clone());
            }
        }
    }

    log::info!(
        "{} {} files",
        if dry_run { "Would modify" } else { "Modified" },
        stats.modified.len()
    );
    stats
}
