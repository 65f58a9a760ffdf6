// File: src/config.rs
use crate::core::types::Tier;
use std::path::Path;

/// Affix directories: prefixes, suffixes, roots.
pub const DEFAULT_SPECIAL_DIRS: [&str; 3] = ["pre", "suf", "root"];

/// How regular-tier occurrences of a word are resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolvePolicy {
    /// Keep the first regular occurrence even when affix files define the word.
    #[default]
    FirstRegular,
    /// Drop every regular occurrence of a word that any affix file defines.
    AffixPrecedence,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Names of the directories whose files are never stripped.
    pub special_dirs: Vec<String>,
    pub policy: ResolvePolicy,
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            special_dirs: DEFAULT_SPECIAL_DIRS.iter().map(|s| s.to_string()).collect(),
            policy: ResolvePolicy::default(),
            dry_run: false,
        }
    }
}

impl PipelineConfig {
    /// Classifies a document path by the directory that directly holds it,
    /// so `data/root/extra/x.json` is a regular file.
    pub fn tier_of(&self, path: &Path) -> Tier {
        path.parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .filter(|name| self.special_dirs.iter().any(|dir| dir == name))
            .map(|_| Tier::Special)
            .unwrap_or(Tier::Regular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_affix_directories_as_special() {
        let config = PipelineConfig::default();
        assert_eq!(config.tier_of(Path::new("data/middle/pre/re.json")), Tier::Special);
        assert_eq!(config.tier_of(Path::new("data/high/suf/ion.json")), Tier::Special);
        assert_eq!(config.tier_of(Path::new("data/CET-4/root/ac.json")), Tier::Special);
        assert_eq!(config.tier_of(Path::new("data/middle/geo_world.json")), Tier::Regular);
    }

    #[test]
    fn file_name_never_counts_as_a_directory() {
        let config = PipelineConfig::default();
        assert_eq!(config.tier_of(Path::new("data/pre")), Tier::Regular);
        assert_eq!(config.tier_of(Path::new("root")), Tier::Regular);
    }

    #[test]
    fn partial_component_matches_are_regular() {
        let config = PipelineConfig::default();
        assert_eq!(config.tier_of(Path::new("data/prefixes/re.json")), Tier::Regular);
        assert_eq!(config.tier_of(Path::new("data/roots/ac.json")), Tier::Regular);
        assert_eq!(config.tier_of(Path::new("/root/data/topic.json")), Tier::Regular);
    }

    #[test]
    fn custom_special_dirs_replace_defaults() {
        let config = PipelineConfig {
            special_dirs: vec!["affix".into()],
            ..PipelineConfig::default()
        };
        assert_eq!(config.tier_of(Path::new("data/affix/un.json")), Tier::Special);
        assert_eq!(config.tier_of(Path::new("data/pre/un.json")), Tier::Regular);
    }
}
