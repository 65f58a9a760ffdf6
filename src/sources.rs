// File: src/sources.rs
use crate::error::{Result, VocabError};
use regex::Regex;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// Where the document paths of one run come from.
#[derive(Debug, Clone, Default)]
pub struct InputSpec {
    /// Explicitly listed files; they come first.
    pub paths: Vec<PathBuf>,
    pub manifest: Option<PathBuf>,
    /// Walked recursively after the listed and manifest files.
    pub data_dir: Option<PathBuf>,
    /// Base for relative manifest entries.
    pub base_dir: PathBuf,
}

/// Listed paths first, then manifest entries, then the directory walk.
/// A file reached under several spellings keeps its first position.
pub fn collect_inputs(spec: &InputSpec) -> Result<Vec<PathBuf>> {
    let mut paths = spec.paths.clone();
    if let Some(manifest) = &spec.manifest {
        paths.extend(read_manifest(manifest, &spec.base_dir)?);
    }
    if let Some(dir) = &spec.data_dir {
        paths.extend(json_files_in(dir, true)?);
    }
    if paths.is_empty() {
        return Err(VocabError::InvalidInput(
            "no input files; pass paths, --manifest or --data-dir".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    paths.retain(|path| {
        let first = seen.insert(path_key(path));
        if !first {
            log::debug!("Dropping repeated input {}", path.display());
        }
        first
    });
    log::info!("Processing {} files", paths.len());
    Ok(paths)
}

/// Identity of a file on disk: its canonical path when it exists, otherwise
/// the absolute path with `.` and `..` folded away.
pub fn path_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        env::current_dir().map(|cwd| cwd.join(path)).unwrap_or_else(|_| path.to_path_buf())
    };
    fold_dots(&absolute)
}

fn fold_dots(path: &Path) -> PathBuf {
    let mut folded = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match folded.components().next_back() {
                Some(Component::Normal(_)) => {
                    folded.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => folded.push(".."),
            },
            other => folded.push(other),
        }
    }
    folded
}

/// Reads an ordered list of document paths from a manifest. Two layouts are
/// understood: a JavaScript data manifest with `const DATA_FILES = [...]`,
/// or a plain list with one path per line (`#` starts a comment).
/// Relative entries are joined onto `base_dir`.
pub fn read_manifest(path: &Path, base_dir: &Path) -> Result<Vec<PathBuf>> {
    let content = fs::read_to_string(path).map_err(|e| VocabError::io(path, e))?;
    let entries = parse_js_manifest(&content).unwrap_or_else(|| parse_plain_manifest(&content));
    log::info!("Manifest {} lists {} files", path.display(), entries.len());
    Ok(entries.into_iter().map(|entry| base_dir.join(entry)).collect())
}

struct ManifestPatterns {
    array: Regex,
    line_comment: Regex,
    quoted: Regex,
}

fn manifest_patterns() -> &'static ManifestPatterns {
    static PATTERNS: OnceLock<ManifestPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ManifestPatterns {
        array: Regex::new(r"(?s)const\s+DATA_FILES\s*=\s*\[(.*?)\];").expect("DATA_FILES pattern"),
        line_comment: Regex::new(r"//[^\n]*").expect("line comment pattern"),
        quoted: Regex::new(r#"['"]([^'"]*)['"]"#).expect("quoted entry pattern"),
    })
}

fn parse_js_manifest(content: &str) -> Option<Vec<String>> {
    let patterns = manifest_patterns();
    let body = patterns.array.captures(content)?.get(1)?.as_str();

    let without_comments = patterns.line_comment.replace_all(body, "");
    Some(
        patterns
            .quoted
            .captures_iter(&without_comments)
            .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
            .filter(|entry| !entry.is_empty())
            .collect(),
    )
}

fn parse_plain_manifest(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// All `.json` files under `dir`, sorted by path so runs are repeatable.
pub fn json_files_in(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(VocabError::InvalidInput(format!("'{}' is not a directory", dir.display())));
    }

    let mut walker = WalkDir::new(dir).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }

    let mut files = Vec::new();
    for entry in walker {
        match entry {
            Ok(entry) if entry.file_type().is_file() && is_json(entry.path()) => {
                files.push(entry.into_path());
            }
            Ok(_) => {}
            Err(e) => log::warn!("Failed to read entry: {e}"),
        }
    }
    files.sort();
    log::debug!("Found {} JSON files under {}", files.len(), dir.display());
    Ok(files)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}
