// File: src/core/loader.rs
use crate::config::PipelineConfig;
use crate::core::types::Document;
use crate::error::{Result, VocabError};
use crate::persistence::load_json;
use crate::sources::path_key;
use serde_json::Value;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// How many of the requested paths made it into the batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadStats {
    pub requested: usize,
    pub loaded: usize,
    pub skipped: usize,
}

/// Parses every path in order. Failures are logged and skipped; document ids
/// are assigned to survivors only, so they stay dense and ordered. A file
/// that already loaded under another spelling is skipped too.
pub fn load_documents(paths: &[PathBuf], config: &PipelineConfig) -> (Vec<Document>, LoadStats) {
    let mut documents = Vec::with_capacity(paths.len());
    let mut stats = LoadStats { requested: paths.len(), ..LoadStats::default() };
    let mut loaded_keys = HashSet::new();

    for path in paths {
        let key = path_key(path);
        if loaded_keys.contains(&key) {
            log::warn!("Skipping {}: same file as an earlier input", path.display());
            stats.skipped += 1;
            continue;
        }
        match load_document(path) {
            Ok(root) => {
                documents.push(Document {
                    id: documents.len(),
                    path: path.clone(),
                    tier: config.tier_of(path),
                    root,
                });
                loaded_keys.insert(key);
                stats.loaded += 1;
            }
            Err(e) => {
                log::warn!("Skipping {}: {e}", path.display());
                stats.skipped += 1;
            }
        }
    }

    log::info!("Loaded {} of {} documents", stats.loaded, stats.requested);
    (documents, stats)
}

fn load_document(path: &Path) -> Result<Value> {
    let root = load_json(path)?;
    let Some(object) = root.as_object() else {
        return Err(VocabError::malformed(path, "root is not an object"));
    };
    match object.get("meanings") {
        Some(Value::Array(_)) => Ok(root),
        Some(_) => Err(VocabError::malformed(path, "`meanings` is not an array")),
        None => Err(VocabError::malformed(path, "missing `meanings`")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Tier;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn skips_missing_and_malformed_files_but_keeps_order() {
        let temp = TempDir::new().expect("tempdir");
        let pre = temp.path().join("pre");
        fs::create_dir_all(&pre).expect("mkdir");

        let good_affix = pre.join("re.json");
        fs::write(&good_affix, r#"{"meanings": []}"#).expect("write");
        let no_meanings = temp.path().join("a.json");
        fs::write(&no_meanings, r#"{"words": []}"#).expect("write");
        let bad_meanings = temp.path().join("b.json");
        fs::write(&bad_meanings, r#"{"meanings": {}}"#).expect("write");
        let not_object = temp.path().join("c.json");
        fs::write(&not_object, "[]").expect("write");
        let broken = temp.path().join("d.json");
        fs::write(&broken, "{").expect("write");
        let good_topic = temp.path().join("topic.json");
        fs::write(&good_topic, r#"{"meanings": [{"words": []}]}"#).expect("write");

        let paths = vec![
            good_affix.clone(),
            temp.path().join("missing.json"),
            no_meanings,
            bad_meanings,
            not_object,
            broken,
            good_topic.clone(),
        ];
        let (docs, stats) = load_documents(&paths, &PipelineConfig::default());

        assert_eq!(stats, LoadStats { requested: 7, loaded: 2, skipped: 5 });
        assert_eq!(docs[0].path, good_affix);
        assert_eq!(docs[0].tier, Tier::Special);
        assert_eq!(docs[1].path, good_topic);
        assert_eq!(docs[1].id, 1);
        assert_eq!(docs[1].tier, Tier::Regular);
    }

    #[test]
    fn one_file_under_two_spellings_loads_once() {
        let temp = TempDir::new().expect("tempdir");
        fs::create_dir_all(temp.path().join("sub")).expect("mkdir");
        let plain = temp.path().join("vocab_r.json");
        fs::write(&plain, r#"{"meanings": [{"words": [{"word": "river"}]}]}"#).expect("write");

        let paths = vec![plain.clone(), temp.path().join("sub/../vocab_r.json")];
        let (docs, stats) = load_documents(&paths, &PipelineConfig::default());

        assert_eq!(stats, LoadStats { requested: 2, loaded: 1, skipped: 1 });
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].path, plain);
    }
}
