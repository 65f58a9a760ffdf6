// File: src/core/resolver.rs
use crate::config::ResolvePolicy;
use crate::core::context::WordIndex;
use crate::core::types::{DocId, Location};
use std::collections::{HashMap, HashSet};

/// Keep/drop decisions for the whole batch.
#[derive(Debug, Default)]
pub struct Resolution {
    /// The one regular location allowed to keep each word.
    designated: HashMap<String, Location>,
    removed_per_doc: HashMap<DocId, usize>,
    pub removed: usize,
    pub kept: usize,
    /// Words found in more than one location.
    pub duplicated_words: usize,
}

impl Resolution {
    /// True when `location` is the regular occurrence that keeps `word`.
    pub fn keeps_regular(&self, word: &str, location: &Location) -> bool {
        self.designated.get(word) == Some(location)
    }

    pub fn removed_in(&self, doc: DocId) -> usize {
        self.removed_per_doc.get(&doc).copied().unwrap_or(0)
    }
}

/// Decides every word independently from its locations.
pub fn resolve(index: &WordIndex, policy: ResolvePolicy) -> Resolution {
    let mut resolution = Resolution::default();

    for (word, record) in index.iter() {
        if record.locations.len() > 1 {
            resolution.duplicated_words += 1;
        }

        let defined_by_affix = record.locations.iter().any(|loc| loc.tier.is_special());
        let mut docs_seen: HashSet<DocId> = HashSet::new();
        let mut regular_kept = false;

        for location in &record.locations {
            let keep = if !docs_seen.insert(location.doc) {
                false
            } else if location.tier.is_special() {
                true
            } else if regular_kept {
                false
            } else if policy == ResolvePolicy::AffixPrecedence && defined_by_affix {
                false
            } else {
                regular_kept = true;
                resolution.designated.insert(word.to_string(), *location);
                true
            };

            if keep {
                resolution.kept += 1;
            } else {
                resolution.removed += 1;
                *resolution.removed_per_doc.entry(location.doc).or_insert(0) += 1;
                log::debug!(
                    "Dropping '{}' at meanings[{}].words[{}] of document #{}",
                    word,
                    location.meaning_idx,
                    location.word_idx,
                    location.doc
                );
            }
        }
    }

    log::info!(
        "Resolved {} duplicated words: keeping {} entries, removing {}",
        resolution.duplicated_words,
        resolution.kept,
        resolution.removed
    );
    resolution
}
