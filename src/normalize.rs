// File: src/normalize.rs
use crate::config::PipelineConfig;
use crate::core::loader::{load_documents, LoadStats};
use crate::core::types::Document;
use crate::core::writer::write_changed;
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
    pub load: LoadStats,
    pub words_changed: usize,
    pub files_modified: usize,
    pub modified_paths: Vec<PathBuf>,
    pub failed_writes: Vec<PathBuf>,
    pub dry_run: bool,
}

/// Lowercases every `meanings[].words[].word` value in place.
/// Returns how many values actually changed.
pub fn lowercase_words(document: &mut Document) -> usize {
    let mut changed = 0;
    let Some(meanings) = document.meanings_mut() else {
        return 0;
    };

    for group in meanings.iter_mut() {
        let Some(words) = group.get_mut("words").and_then(Value::as_array_mut) else {
            continue;
        };
        for entry in words.iter_mut() {
            let Some(Value::String(word)) = entry.get_mut("word") else {
                continue;
            };
            let lowered = word.to_lowercase();
            if lowered != *word {
                *word = lowered;
                changed += 1;
            }
        }
    }
    changed
}

/// Lowercases the words of every document and writes the changed ones.
pub fn normalize_paths(paths: &[PathBuf], config: &PipelineConfig) -> NormalizeReport {
    let (documents, load) = load_documents(paths, config);

    let mut words_changed = 0;
    let mut updated = documents.clone();
    for document in updated.iter_mut() {
        let changed = lowercase_words(document);
        if changed > 0 {
            log::info!("{}: {} words lowercased", document.path.display(), changed);
            words_changed += changed;
        }
    }

    let written = write_changed(&documents, &updated, config.dry_run);
    NormalizeReport {
        load,
        words_changed,
        files_modified: written.modified.len(),
        modified_paths: written.modified,
        failed_writes: written.failed,
        dry_run: config.dry_run,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Tier;
    use serde_json::json;

    #[test]
    fn lowercases_only_word_fields() {
        let mut document = Document {
            id: 0,
            path: PathBuf::from("month.json"),
            tier: Tier::Regular,
            root: json!({
                "prefix": "Month",
                "meanings": [{
                    "displayName": "Months",
                    "words": [
                        {"word": "January", "example": "In January it snows."},
                        {"word": "may"},
                        {"word": 7},
                        {"note": "Keep"}
                    ]
                }]
            }),
        };

        assert_eq!(lowercase_words(&mut document), 1);
        assert_eq!(
            document.root,
            json!({
                "prefix": "Month",
                "meanings": [{
                    "displayName": "Months",
                    "words": [
                        {"word": "january", "example": "In January it snows."},
                        {"word": "may"},
                        {"word": 7},
                        {"note": "Keep"}
                    ]
                }]
            })
        );
        assert_eq!(lowercase_words(&mut document), 0);
    }
}
