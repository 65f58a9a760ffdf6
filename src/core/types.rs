// src/core/types.rs
use serde_json::Value;
use std::path::PathBuf;

/// Position of a document in the loaded batch. Input order is priority order.
pub type DocId = usize;

/// Which dedup rules apply to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// Affix directory (prefix, suffix, root). Never stripped.
    Special,
    /// Topic and vocabulary files.
    Regular,
}

impl Tier {
    pub fn is_special(self) -> bool {
        matches!(self, Tier::Special)
    }
}

/// One parsed vocabulary file.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocId,
    pub path: PathBuf,
    pub tier: Tier,
    /// The whole JSON object, key order as read from disk.
    pub root: Value,
}

impl Document {
    /// The `meanings` array. The loader guarantees it exists.
    pub fn meanings(&self) -> &[Value] {
        self.root
            .get("meanings")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn meanings_mut(&mut self) -> Option<&mut Vec<Value>> {
        self.root.get_mut("meanings").and_then(Value::as_array_mut)
    }

    /// Every indexable word with its location, in document order.
    pub fn word_locations(&self) -> Vec<(Location, &str, &Value)> {
        let mut found = Vec::new();
        for (meaning_idx, group) in self.meanings().iter().enumerate() {
            let Some(words) = words_of(group) else {
                log::debug!("{}: meanings[{}] has no words array", self.path.display(), meaning_idx);
                continue;
            };
            for (word_idx, entry) in words.iter().enumerate() {
                if let Some(word) = word_of(entry) {
                    let location = Location { doc: self.id, tier: self.tier, meaning_idx, word_idx };
                    found.push((location, word, entry));
                }
            }
        }
        found
    }
}

/// Where one occurrence of a word lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub doc: DocId,
    pub tier: Tier,
    pub meaning_idx: usize,
    pub word_idx: usize,
}

/// The `words` array of a meaning group, if the group has the expected shape.
pub fn words_of(group: &Value) -> Option<&Vec<Value>> {
    group.as_object()?.get("words")?.as_array()
}

/// The dedup key of a word entry. Entries that are not objects, lack `word`,
/// or carry a non-string or empty `word` have no key.
pub fn word_of(entry: &Value) -> Option<&str> {
    entry
        .as_object()?
        .get("word")?
        .as_str()
        .filter(|w| !w.is_empty())
}
