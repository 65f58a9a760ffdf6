// File: src/core/context.rs
use crate::core::types::{Document, Location};
use serde_json::Value;
use std::collections::HashMap;

/// Everything the batch knows about one word string.
#[derive(Debug, Clone)]
pub struct WordRecord {
    /// Payload of the first occurrence across the whole batch, any tier.
    pub canonical: Value,
    /// Every occurrence, in input order.
    pub locations: Vec<Location>,
}

/// Per-run index from word string to its canonical payload and locations.
/// Filled once by `build`, read-only afterwards.
#[derive(Debug, Default)]
pub struct WordIndex {
    records: HashMap<String, WordRecord>,
    /// Words in first-seen order, so reports and resolution are deterministic.
    order: Vec<String>,
    entries: usize,
}

impl WordIndex {
    /// Indexes every document in batch order.
    pub fn build(documents: &[Document]) -> Self {
        let mut index = Self::default();
        for document in documents {
            for (location, word, entry) in document.word_locations() {
                index.record(word, entry, location);
            }
        }
        log::info!(
            "Indexed {} unique words from {} entries",
            index.order.len(),
            index.entries
        );
        index
    }

    /// First writer wins the canonical payload; every call appends a location.
    fn record(&mut self, word: &str, entry: &Value, location: Location) {
        self.entries += 1;
        match self.records.get_mut(word) {
            Some(record) => record.locations.push(location),
            None => {
                self.records.insert(
                    word.to_string(),
                    WordRecord { canonical: entry.clone(), locations: vec![location] },
                );
                self.order.push(word.to_string());
            }
        }
    }

    pub fn get(&self, word: &str) -> Option<&WordRecord> {
        self.records.get(word)
    }

    /// Words paired with their records, in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WordRecord)> {
        self.order
            .iter()
            .filter_map(|word| self.records.get(word).map(|record| (word.as_str(), record)))
    }

    pub fn unique_words(&self) -> usize {
        self.order.len()
    }

    /// Number of indexed entries, repeats included.
    pub fn total_entries(&self) -> usize {
        self.entries
    }
}
