use chrono::{Local, TimeZone};
use pretty_assertions::assert_eq;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use vocab_core::config::PipelineConfig;
use vocab_core::persistence::{ensure_backup, BackupMode, BackupOutcome, BackupRequest};
use vocab_core::sources::{collect_inputs, InputSpec};
use vocab_core::{DedupEngine, DedupReport, VocabError};

const REPORT: &str = r#"{"meanings": [{"words": [{"word": "report"}, {"word": "river"}]}]}"#;
const TOPIC: &str = r#"{"meanings": [{"words": [{"word": "report"}, {"word": "xylophone"}]}]}"#;

fn data_tree(root: &Path) -> PathBuf {
    let data = root.join("data");
    fs::create_dir_all(data.join("high")).expect("mkdir");
    fs::write(data.join("high/vocab_r.json"), REPORT).expect("write");
    fs::write(data.join("topic_x.json"), TOPIC).expect("write");
    data
}

fn backups_in(dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = walkdir::WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir() && entry.file_name().to_string_lossy().contains("_backup_"))
        .map(|entry| entry.into_path())
        .collect();
    found.sort();
    found
}

/// The order every mutating command follows: gather inputs, pass the backup
/// gate, then run the pipeline.
fn guarded_dedup(spec: &InputSpec, request: &BackupRequest, answers: &str) -> vocab_core::Result<DedupReport> {
    let paths = collect_inputs(spec)?;
    let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).single().expect("time");
    ensure_backup(request, &mut Cursor::new(answers), &mut Vec::new(), now)?;
    let config = PipelineConfig { dry_run: request.dry_run, ..PipelineConfig::default() };
    Ok(DedupEngine::new(config).run(&paths))
}

#[test]
fn declined_backup_stops_before_any_file_changes() {
    let temp = TempDir::new().expect("tempdir");
    let data = data_tree(temp.path());
    let spec = InputSpec { data_dir: Some(data.clone()), base_dir: temp.path().to_path_buf(), ..InputSpec::default() };
    let request = BackupRequest { source: Some(data.clone()), mode: BackupMode::Ask, dry_run: false };

    let result = guarded_dedup(&spec, &request, "n\nn\n");

    assert!(matches!(result, Err(VocabError::Aborted)));
    assert_eq!(fs::read_to_string(data.join("high/vocab_r.json")).expect("read"), REPORT);
    assert_eq!(fs::read_to_string(data.join("topic_x.json")).expect("read"), TOPIC);
    assert_eq!(backups_in(temp.path()), Vec::<PathBuf>::new());
}

#[test]
fn dry_run_never_creates_a_backup() {
    let temp = TempDir::new().expect("tempdir");
    let data = data_tree(temp.path());
    let spec = InputSpec { data_dir: Some(data.clone()), base_dir: temp.path().to_path_buf(), ..InputSpec::default() };
    let request = BackupRequest { source: Some(data.clone()), mode: BackupMode::Always, dry_run: true };

    let report = guarded_dedup(&spec, &request, "").expect("run");

    assert!(report.dry_run);
    assert_eq!(report.entries_removed, 1);
    assert_eq!(backups_in(temp.path()), Vec::<PathBuf>::new());
    assert_eq!(fs::read_to_string(data.join("topic_x.json")).expect("read"), TOPIC);
}

#[test]
fn backup_of_a_dotted_source_lands_beside_it() {
    let temp = TempDir::new().expect("tempdir");
    let data = data_tree(temp.path());
    let request = BackupRequest { source: Some(data.join(".")), mode: BackupMode::Always, dry_run: false };
    let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).single().expect("time");

    let outcome = ensure_backup(&request, &mut Cursor::new(""), &mut Vec::new(), now).expect("backup");

    let expected = fs::canonicalize(temp.path()).expect("canonical").join("data_backup_2024-03-09_070501");
    assert_eq!(outcome, BackupOutcome::Created { path: expected.clone(), files: 2 });
    assert_eq!(fs::read_to_string(expected.join("high/vocab_r.json")).expect("read"), REPORT);
    assert_eq!(backups_in(&data), Vec::<PathBuf>::new());
}

#[test]
fn accepted_prompt_backs_up_then_dedups() {
    let temp = TempDir::new().expect("tempdir");
    let data = data_tree(temp.path());
    let spec = InputSpec { data_dir: Some(data.clone()), base_dir: temp.path().to_path_buf(), ..InputSpec::default() };
    let request = BackupRequest { source: Some(data.clone()), mode: BackupMode::Ask, dry_run: false };

    let report = guarded_dedup(&spec, &request, "\n").expect("run");

    assert_eq!(report.files_modified, 1);
    let backups = backups_in(temp.path());
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(backups[0].join("topic_x.json")).expect("read"), TOPIC);
}

#[test]
fn manifest_and_walk_of_the_same_tree_do_not_strip_words() {
    let temp = TempDir::new().expect("tempdir");
    let data = data_tree(temp.path());
    let manifest = temp.path().join("files.txt");
    fs::write(&manifest, "./data/high/vocab_r.json\ndata/high/../topic_x.json\n").expect("write");
    let spec = InputSpec {
        paths: vec![data.join("topic_x.json")],
        manifest: Some(manifest),
        data_dir: Some(data.clone()),
        base_dir: temp.path().to_path_buf(),
    };

    let paths = collect_inputs(&spec).expect("inputs");
    assert_eq!(paths, vec![data.join("topic_x.json"), temp.path().join("./data/high/vocab_r.json")]);

    let request = BackupRequest { mode: BackupMode::Never, ..BackupRequest::default() };
    let report = guarded_dedup(&spec, &request, "").expect("run");
    assert_eq!(report.load.loaded, 2);
    assert_eq!(report.entries_removed, 1);
    let vocab_r: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(data.join("high/vocab_r.json")).expect("read")).expect("parse");
    assert_eq!(vocab_r["meanings"][0]["words"][0]["word"], "river");
}
