use crate::config::PipelineConfig;
use crate::core::context::WordIndex;
use crate::core::loader::{load_documents, LoadStats};
use crate::core::rebuilder::rebuild_all;
use crate::core::resolver::resolve;
use crate::core::writer::write_changed;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of one dedup run. Counts only cover documents that loaded.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DedupReport {
    pub load: LoadStats,
    pub unique_words: usize,
    pub entries_before: usize,
    pub entries_kept: usize,
    pub entries_removed: usize,
    pub files_modified: usize,
    pub modified_paths: Vec<PathBuf>,
    pub failed_writes: Vec<PathBuf>,
    pub dry_run: bool,
}

// The dedup pipeline: load, index, resolve, rebuild, then write.
// Every read finishes before the first write.
pub struct DedupEngine {
    config: PipelineConfig,
}

impl DedupEngine {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn run(&self, paths: &[PathBuf]) -> DedupReport {
        // 1. Load everything that parses
        let (documents, load) = load_documents(paths, &self.config);

        // 2. Index canonical payloads and locations
        let index = WordIndex::build(&documents);

        // 3. Decide what stays
        let resolution = resolve(&index, self.config.policy);
        for document in &documents {
            let removed = resolution.removed_in(document.id);
            if removed > 0 {
                log::info!("{}: removing {} entries", document.path.display(), removed);
            }
        }

        // 4. Rebuild in memory
        let rebuilt = rebuild_all(&documents, &index, &resolution);

        // 5. Write only what changed
        let written = write_changed(&documents, &rebuilt, self.config.dry_run);

        DedupReport {
            load,
            unique_words: index.unique_words(),
            entries_before: index.total_entries(),
            entries_kept: resolution.kept,
            entries_removed: resolution.removed,
            files_modified: written.modified.len(),
            modified_paths: written.modified,
            failed_writes: written.failed,
            dry_run: self.config.dry_run,
        }
    }
}
