// File: src/persistence.rs
use crate::error::{Result, VocabError};
use crate::sources::path_key;
use chrono::{DateTime, Local};
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use walkdir::WalkDir;

/// Reads and parses one JSON file.
pub fn load_json(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|e| VocabError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| VocabError::json(path, e))
}

/// Pretty-prints `value` with two-space indentation and raw UTF-8, then swaps
/// it over `path` through a temp file in the same directory.
pub fn save_json(path: &Path, value: &Value) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir).map_err(|e| VocabError::io(parent_dir, e))?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| VocabError::io(parent_dir, e))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer_pretty(&mut writer, value).map_err(|e| VocabError::json(path, e))?;
        writer.flush().map_err(|e| VocabError::io(path, e))?;
    }

    temp_file.persist(path).map_err(|e| VocabError::io(path, e.error))?;
    Ok(())
}

/// `<name>_backup_<YYYY-mm-dd_HHMMSS>` beside the source directory. The
/// source is resolved first, so `.` or `data/.` name a sibling of the real
/// directory rather than a path inside it.
pub fn backup_dir_for(source: &Path, now: DateTime<Local>) -> Result<PathBuf> {
    let resolved = fs::canonicalize(source).map_err(|e| VocabError::io(source, e))?;
    let (Some(parent), Some(name)) = (resolved.parent(), resolved.file_name()) else {
        return Err(VocabError::Backup(format!("cannot place a backup beside '{}'", resolved.display())));
    };
    let stamp = now.format("%Y-%m-%d_%H%M%S");
    Ok(parent.join(format!("{}_backup_{stamp}", name.to_string_lossy())))
}

/// Copies the whole `source` tree into `target`. Refuses to overwrite or to
/// write inside the source; a failed copy removes what it wrote.
pub fn copy_tree(source: &Path, target: &Path) -> Result<u64> {
    if !source.is_dir() {
        return Err(VocabError::Backup(format!("'{}' is not a directory", source.display())));
    }
    if target.exists() {
        return Err(VocabError::Backup(format!("'{}' already exists", target.display())));
    }
    let source_key = path_key(source);
    if resolve_target(target).starts_with(&source_key) {
        return Err(VocabError::Backup(format!(
            "'{}' lies inside '{}'",
            target.display(),
            source_key.display()
        )));
    }

    let copied = copy_entries(source, target);
    if copied.is_err() && target.exists() {
        if let Err(e) = fs::remove_dir_all(target) {
            log::warn!("Could not remove partial backup {}: {e}", target.display());
        }
    }
    copied
}

fn copy_entries(source: &Path, target: &Path) -> Result<u64> {
    let mut copied = 0;
    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|e| VocabError::Backup(e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| VocabError::Backup(e.to_string()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination).map_err(|e| VocabError::io(&destination, e))?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &destination).map_err(|e| VocabError::io(&destination, e))?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Absolute form of a path that does not exist yet, resolved through its
/// parent so symlinked prefixes compare equal to `path_key` of the source.
fn resolve_target(target: &Path) -> PathBuf {
    let parent = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), target.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => path_key(target),
    }
}

/// What the user chose before a destructive run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackupChoice {
    Create,
    Skip,
    Abort,
}

/// Asks whether to back up `backup_dir` first. Empty answer means yes, a
/// closed input means no. Declining needs an explicit `y` to continue.
pub fn prompt_backup<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    backup_dir: &Path,
) -> std::io::Result<BackupChoice> {
    write!(
        output,
        "This run modifies source files in place.\nCreate backup directory '{}'? (Y/n): ",
        backup_dir.display()
    )?;
    output.flush()?;

    let answer = read_answer(input)?.unwrap_or_else(|| "n".to_string());
    if answer.is_empty() || answer == "y" {
        return Ok(BackupChoice::Create);
    }

    write!(output, "Continue without a backup? Original files will be overwritten. (y/N): ")?;
    output.flush()?;
    match read_answer(input)?.as_deref() {
        Some("y") => Ok(BackupChoice::Skip),
        _ => Ok(BackupChoice::Abort),
    }
}

fn read_answer<R: BufRead>(input: &mut R) -> std::io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_lowercase()))
}

/// How the backup question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackupMode {
    /// Prompt on the given input.
    #[default]
    Ask,
    /// Create the backup without asking.
    Always,
    /// Proceed without a backup and without asking.
    Never,
}

#[derive(Debug, Clone, Default)]
pub struct BackupRequest {
    /// Directory to copy.
    pub source: Option<PathBuf>,
    pub mode: BackupMode,
    /// Nothing will be written, so nothing needs backing up.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// Dry run.
    NotNeeded,
    /// The user or `BackupMode::Never` chose to go on without one.
    Skipped,
    Created { path: PathBuf, files: u64 },
}

/// The gate every mutating job passes first. A declined prompt yields
/// `VocabError::Aborted`; a failed copy yields `VocabError::Backup` or `Io`.
/// Either way the caller must stop before touching any document.
pub fn ensure_backup<R: BufRead, W: Write>(
    request: &BackupRequest,
    input: &mut R,
    output: &mut W,
    now: DateTime<Local>,
) -> Result<BackupOutcome> {
    if request.dry_run {
        log::debug!("Dry run, no backup needed");
        return Ok(BackupOutcome::NotNeeded);
    }
    if request.mode == BackupMode::Never {
        log::warn!("Skipping backup; files will be modified in place");
        return Ok(BackupOutcome::Skipped);
    }

    let source = request.source.as_deref().ok_or_else(|| {
        VocabError::InvalidInput("nothing to back up; pass --backup-source <DIR> or --no-backup".to_string())
    })?;
    let target = backup_dir_for(source, now)?;

    let choice = match request.mode {
        BackupMode::Always => BackupChoice::Create,
        _ => prompt_backup(input, output, &target)
            .map_err(|e| VocabError::Backup(format!("failed to read answer: {e}")))?,
    };

    match choice {
        BackupChoice::Create => {
            let files = copy_tree(source, &target)?;
            log::info!("Backed up {} files to {}", files, target.display());
            Ok(BackupOutcome::Created { path: target, files })
        }
        BackupChoice::Skip => {
            log::warn!("Backup declined; files will be modified in place");
            Ok(BackupOutcome::Skipped)
        }
        BackupChoice::Abort => Err(VocabError::Aborted),
    }
}
