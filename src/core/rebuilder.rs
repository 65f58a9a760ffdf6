// File: src/core/rebuilder.rs
use crate::core::context::WordIndex;
use crate::core::resolver::Resolution;
use crate::core::types::{word_of, Document, Location};
use serde_json::Value;
use std::collections::HashSet;

/// Returns a rebuilt copy of `original`. Only `meanings[].words` arrays change;
/// entries without a usable `word` stay where they were.
pub fn rebuild_document(original: &Document, index: &WordIndex, resolution: &Resolution) -> Document {
    let mut rebuilt = original.clone();
    let Some(meanings) = rebuilt.meanings_mut() else {
        return rebuilt;
    };

    let mut seen_in_document: HashSet<&str> = HashSet::new();

    for (meaning_idx, (group, source_group)) in meanings.iter_mut().zip(original.meanings()).enumerate() {
        let Some(source_words) = source_group.get("words").and_then(Value::as_array) else {
            continue;
        };
        let Some(target) = group.get_mut("words").and_then(Value::as_array_mut) else {
            continue;
        };

        let mut words = Vec::with_capacity(source_words.len());
        for (word_idx, entry) in source_words.iter().enumerate() {
            let Some(word) = word_of(entry) else {
                words.push(entry.clone());
                continue;
            };
            if !seen_in_document.insert(word) {
                continue;
            }

            if original.tier.is_special() {
                words.push(entry.clone());
                continue;
            }

            let location = Location { doc: original.id, tier: original.tier, meaning_idx, word_idx };
            if resolution.keeps_regular(word, &location) {
                let payload = index
                    .get(word)
                    .map(|record| record.canonical.clone())
                    .unwrap_or_else(|| entry.clone());
                words.push(payload);
            }
        }
        *target = words;
    }

    rebuilt
}

/// Rebuilds every document in batch order.
pub fn rebuild_all(documents: &[Document], index: &WordIndex, resolution: &Resolution) -> Vec<Document> {
    documents
        .iter()
        .map(|document| rebuild_document(document, index, resolution))
        .collect()
}
