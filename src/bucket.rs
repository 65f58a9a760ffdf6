// File: src/bucket.rs
use crate::config::PipelineConfig;
use crate::core::loader::load_documents;
use crate::core::types::{words_of, Document};
use crate::error::{Result, VocabError};
use crate::persistence::save_json;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

const THEME_COLORS: [&str; 10] = [
    "#6366f1", "#3b82f6", "#10b981", "#f59e0b", "#ef4444",
    "#8b5cf6", "#ec4899", "#06b6d4", "#f97316", "#84cc16",
];

// --- Output layout of one generated vocab_<letter>.json ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketDocument {
    prefix: String,
    affix_type: &'static str,
    meanings: Vec<BucketMeaning>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BucketMeaning {
    meaning_id: String,
    display_name: String,
    theme_color: &'static str,
    prefix_intro: PrefixIntro,
    words: Vec<Value>,
}

#[derive(Debug, Serialize)]
struct PrefixIntro {
    title: String,
    description: String,
    imagery: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BucketReport {
    pub source_files: usize,
    pub skipped_words: usize,
    /// (generated file, word count) in alphabet order.
    pub generated: Vec<(PathBuf, usize)>,
}

/// Whether a file name looks like one of our own outputs.
pub fn is_bucket_output(path: &Path) -> bool {
    static OUTPUT_NAME: OnceLock<Regex> = OnceLock::new();
    let pattern = OUTPUT_NAME.get_or_init(|| Regex::new(r"^vocab_[a-z]\.json$").expect("output name pattern"));
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| pattern.is_match(name))
        .unwrap_or(false)
}

/// Groups word entries by lowercase ASCII initial. Entries whose trimmed word
/// does not start with a letter are counted and left out.
pub fn bucket_words(documents: &[Document]) -> (BTreeMap<char, Vec<Value>>, usize) {
    let mut buckets: BTreeMap<char, Vec<Value>> = BTreeMap::new();
    let mut skipped = 0;

    for document in documents {
        for group in document.meanings() {
            let Some(words) = words_of(group) else {
                continue;
            };
            for entry in words {
                let Some(word) = entry.get("word").and_then(Value::as_str).map(str::trim) else {
                    continue;
                };
                if word.is_empty() {
                    continue;
                }
                match word.chars().next().map(|c| c.to_ascii_lowercase()) {
                    Some(initial) if initial.is_ascii_lowercase() => {
                        buckets.entry(initial).or_default().push(entry.clone());
                    }
                    _ => skipped += 1,
                }
            }
        }
    }

    for words in buckets.values_mut() {
        words.sort_by_cached_key(|entry| {
            entry.get("word").and_then(Value::as_str).unwrap_or("").to_lowercase()
        });
    }
    (buckets, skipped)
}

fn bucket_document(initial: char, words: Vec<Value>) -> BucketDocument {
    let upper = initial.to_ascii_uppercase();
    let alphabet_index = (initial as u8 - b'a') as usize;
    BucketDocument {
        prefix: format!("Vocab {upper}"),
        affix_type: "topic",
        meanings: vec![BucketMeaning {
            meaning_id: format!("vocab_{initial}"),
            display_name: format!("Vocabulary {upper}"),
            theme_color: THEME_COLORS[alphabet_index % THEME_COLORS.len()],
            prefix_intro: PrefixIntro {
                title: format!("Core words starting with {upper}"),
                description: format!("High-frequency mixed vocabulary starting with {upper}."),
                imagery: format!("Core vocabulary for the letter {upper}."),
            },
            words,
        }],
    }
}

/// Regroups the words of `paths` into `out_dir/vocab_<letter>.json`.
pub fn write_buckets(paths: &[PathBuf], out_dir: &Path) -> Result<BucketReport> {
    let sources: Vec<PathBuf> = paths
        .iter()
        .filter(|path| {
            let own_output = is_bucket_output(path);
            if own_output {
                log::info!("Skipping generated file {}", path.display());
            }
            !own_output
        })
        .cloned()
        .collect();

    let (documents, load) = load_documents(&sources, &PipelineConfig::default());
    let (buckets, skipped_words) = bucket_words(&documents);

    fs::create_dir_all(out_dir).map_err(|e| VocabError::io(out_dir, e))?;

    let mut report = BucketReport { source_files: load.loaded, skipped_words, generated: Vec::new() };
    for (initial, words) in buckets {
        let count = words.len();
        let path = out_dir.join(format!("vocab_{initial}.json"));
        let value = serde_json::to_value(bucket_document(initial, words))
            .map_err(|e| VocabError::json(&path, e))?;
        save_json(&path, &value)?;
        log::info!("Generated {} ({} words)", path.display(), count);
        report.generated.push((path, count));
    }
    Ok(report)
}
