// File: src/filter.rs
use crate::core::types::words_of;
use crate::error::{Result, VocabError};
use crate::persistence::load_json;
use crate::sources::json_files_in;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// Closers appended once when a word list was cut off mid-document.
const TRUNCATION_REPAIR: &str = "]}]";

#[derive(Debug, Clone, Default, Serialize)]
pub struct RemainingReport {
    pub source_words: usize,
    pub filter_words: usize,
    pub filter_files: usize,
    pub remaining: Vec<String>,
}

/// Pulls the JSON payload out of a markdown file: the first fenced block if
/// there is one, otherwise the whole text.
pub fn extract_payload(markdown: &str) -> Result<Value> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let fence = FENCE.get_or_init(|| Regex::new(r"(?s)```(?:md|json)?\s*(.*?)```").expect("fence pattern"));
    let body = fence
        .captures(markdown)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(markdown)
        .trim();
    let body = body.strip_suffix(',').unwrap_or(body);

    match serde_json::from_str(body) {
        Ok(value) => Ok(value),
        Err(first) => {
            log::debug!("Payload did not parse ({first}), retrying with closers appended");
            serde_json::from_str(&format!("{body}{TRUNCATION_REPAIR}"))
                .map_err(|_| VocabError::InvalidInput(format!("word list is not valid JSON: {first}")))
        }
    }
}

/// Words of a payload: document-shaped `meanings[].words[].word`, a top-level
/// array of strings, word objects or groups, or a `words` array.
pub fn collect_words(payload: &Value, into: &mut BTreeSet<String>) {
    match payload {
        Value::Array(items) => collect_items(items, into),
        Value::Object(map) => {
            if let Some(meanings) = map.get("meanings").and_then(Value::as_array) {
                for group in meanings {
                    if let Some(words) = words_of(group) {
                        collect_items(words, into);
                    }
                }
            }
            if let Some(words) = map.get("words").and_then(Value::as_array) {
                collect_items(words, into);
            }
        }
        _ => {}
    }
}

fn collect_items(items: &[Value], into: &mut BTreeSet<String>) {
    for item in items {
        match item {
            Value::String(word) => add_word(word, into),
            Value::Object(map) => match map.get("word") {
                Some(Value::String(word)) => add_word(word, into),
                Some(_) => {}
                None => {
                    if let Some(words) = map.get("words").and_then(Value::as_array) {
                        collect_items(words, into);
                    }
                }
            },
            _ => {}
        }
    }
}

fn add_word(word: &str, into: &mut BTreeSet<String>) {
    let word = word.trim().to_lowercase();
    if !word.is_empty() {
        into.insert(word);
    }
}

/// Words of `source_md` that no JSON document under `filter_dir` defines,
/// lowercased and sorted.
pub fn remaining_words(source_md: &Path, filter_dir: &Path) -> Result<RemainingReport> {
    let markdown = fs::read_to_string(source_md).map_err(|e| VocabError::io(source_md, e))?;
    let mut source = BTreeSet::new();
    collect_words(&extract_payload(&markdown)?, &mut source);
    log::info!("{} unique words in {}", source.len(), source_md.display());

    let files = json_files_in(filter_dir, true)?;
    let mut known = BTreeSet::new();
    for path in &files {
        match load_json(path) {
            Ok(value) => collect_words(&value, &mut known),
            Err(e) => log::warn!("Skipping {}: {e}", path.display()),
        }
    }
    log::info!("{} unique words across {} files in {}", known.len(), files.len(), filter_dir.display());
    if known.is_empty() {
        log::warn!("No words found under {}; check the document layout", filter_dir.display());
    }

    Ok(RemainingReport {
        source_words: source.len(),
        filter_words: known.len(),
        filter_files: files.len(),
        remaining: source.difference(&known).cloned().collect(),
    })
}

/// Writes the remaining words with a count header. Nothing is written for an
/// empty list; returns whether the file was written.
pub fn write_remaining(path: &Path, words: &[String]) -> Result<bool> {
    if words.is_empty() {
        return Ok(false);
    }
    let mut content = format!("--- remaining words ({}) ---\n", words.len());
    for word in words {
        content.push_str(word);
        content.push('\n');
    }
    fs::write(path, content).map_err(|e| VocabError::io(path, e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn extracts_fenced_json_and_repairs_truncation() {
        let md = "# Middle school list\n```json\n[{\"words\": [{\"word\": \"Apple\"}, {\"word\": \"pear\"},\n```\n";
        let payload = extract_payload(md).expect("payload");
        let mut words = BTreeSet::new();
        collect_words(&payload, &mut words);
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["apple", "pear"]);
    }

    #[test]
    fn accepts_plain_string_lists() {
        let payload = extract_payload("[\" Bee \", \"cat\", 3]").expect("payload");
        let mut words = BTreeSet::new();
        collect_words(&payload, &mut words);
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["bee", "cat"]);
    }

    #[test]
    fn does_not_harvest_strings_outside_word_slots() {
        let mut words = BTreeSet::new();
        collect_words(
            &json!({"title": "zebra", "meanings": [{"tags": ["yak"], "words": [{"word": "owl", "example": "an owl"}]}]}),
            &mut words,
        );
        assert_eq!(words.into_iter().collect::<Vec<_>>(), vec!["owl"]);
    }

    #[test]
    fn rejects_unrecoverable_payload() {
        assert!(matches!(extract_payload("not json at all"), Err(VocabError::InvalidInput(_))));
    }

    #[test]
    fn difference_against_directory_tree() {
        let temp = TempDir::new().expect("tempdir");
        let md = temp.path().join("middle.md");
        fs::write(&md, "```\n[\"apple\", \"Pear\", \"plum\"]\n```").expect("write");
        let dir = temp.path().join("middle");
        fs::create_dir_all(dir.join("pre")).expect("mkdir");
        fs::write(dir.join("pre/re.json"), r#"{"meanings": [{"words": [{"word": "PEAR"}]}]}"#).expect("write");
        fs::write(dir.join("broken.json"), "{").expect("write");

        let report = remaining_words(&md, &dir).expect("report");
        assert_eq!(report.remaining, vec!["apple", "plum"]);
        assert_eq!(report.filter_files, 2);

        let out = temp.path().join("remaining_words.txt");
        assert!(write_remaining(&out, &report.remaining).expect("write"));
        assert_eq!(fs::read_to_string(&out).expect("read"), "--- remaining words (2) ---\napple\nplum\n");
        assert!(!write_remaining(&temp.path().join("none.txt"), &[]).expect("write"));
    }
}
