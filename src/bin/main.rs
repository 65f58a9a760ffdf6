use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::style::Stylize;
use serde::Serialize;
use std::io::{stdin, stdout};
use std::path::PathBuf;
use std::process::ExitCode;
use vocab_core::bucket::write_buckets;
use vocab_core::config::{PipelineConfig, ResolvePolicy, DEFAULT_SPECIAL_DIRS};
use vocab_core::filter::{remaining_words, write_remaining};
use vocab_core::normalize::normalize_paths;
use vocab_core::persistence::{ensure_backup, BackupMode, BackupOutcome, BackupRequest};
use vocab_core::sources::{collect_inputs, json_files_in, InputSpec};
use vocab_core::{DedupEngine, VocabError};

#[derive(Parser)]
#[command(name = "vocab_tidy")]
#[command(about = "Maintenance jobs for vocabulary JSON data", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log only warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print the final summary as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Remove duplicate word entries across the data files
    Dedup(DedupArgs),
    /// Lowercase every `word` value
    Normalize(NormalizeArgs),
    /// Regroup words into vocab_<letter>.json files
    Bucket(BucketArgs),
    /// List words from a markdown word list that no data file defines yet
    Remaining(RemainingArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Data files, in priority order
    paths: Vec<PathBuf>,

    /// File listing data files (plain list or a JS `DATA_FILES` manifest)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Directory to walk for .json files (appended after listed files)
    #[arg(long, env = "VOCAB_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Base directory for relative manifest entries
    #[arg(long, default_value = ".")]
    base_dir: PathBuf,
}

#[derive(Args)]
struct SafetyArgs {
    /// Create the backup without asking
    #[arg(long, conflicts_with = "no_backup")]
    backup: bool,

    /// Proceed without a backup and without asking
    #[arg(long)]
    no_backup: bool,

    /// Directory to back up (defaults to --data-dir)
    #[arg(long)]
    backup_source: Option<PathBuf>,

    /// Report what would change without writing anything
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args)]
struct DedupArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    safety: SafetyArgs,

    /// Affix directory names (repeatable)
    #[arg(long = "special-dir", default_values_t = DEFAULT_SPECIAL_DIRS.map(String::from))]
    special_dirs: Vec<String>,

    /// How topic files treat words that affix files already define
    #[arg(long, value_enum, default_value_t = PolicyArg::FirstRegular)]
    policy: PolicyArg,
}

#[derive(Args)]
struct NormalizeArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    safety: SafetyArgs,
}

#[derive(Args)]
struct BucketArgs {
    /// Directory holding the source files
    #[arg(default_value = ".")]
    dir: PathBuf,

    /// Include subdirectories
    #[arg(long)]
    recursive: bool,

    /// Output directory for vocab_<letter>.json
    #[arg(long, default_value = "output_vocab")]
    out: PathBuf,
}

#[derive(Args)]
struct RemainingArgs {
    /// Markdown file holding the word list
    #[arg(long, default_value = "middle.md")]
    source: PathBuf,

    /// Directory of data files whose words are filtered out
    #[arg(long, default_value = "middle")]
    filter_dir: PathBuf,

    /// Where to write the remaining words
    #[arg(long, default_value = "remaining_words.txt")]
    output: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// Keep the first topic-file copy even if an affix file has the word
    FirstRegular,
    /// Drop topic-file copies of words that an affix file defines
    AffixPrecedence,
}

impl From<&InputArgs> for InputSpec {
    fn from(args: &InputArgs) -> Self {
        InputSpec {
            paths: args.paths.clone(),
            manifest: args.manifest.clone(),
            data_dir: args.data_dir.clone(),
            base_dir: args.base_dir.clone(),
        }
    }
}

impl SafetyArgs {
    fn request(&self, input: &InputArgs) -> BackupRequest {
        let mode = if self.backup {
            BackupMode::Always
        } else if self.no_backup {
            BackupMode::Never
        } else {
            BackupMode::Ask
        };
        BackupRequest {
            source: self.backup_source.clone().or_else(|| input.data_dir.clone()),
            mode,
            dry_run: self.dry_run,
        }
    }
}

impl From<PolicyArg> for ResolvePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FirstRegular => ResolvePolicy::FirstRegular,
            PolicyArg::AffixPrecedence => ResolvePolicy::AffixPrecedence,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e.downcast_ref::<VocabError>(), Some(VocabError::Aborted)) {
                eprintln!("{}", "Operation cancelled. No files were changed.".yellow());
            } else {
                eprintln!("{} {e:#}", "error:".red().bold());
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Dedup(args) => {
            let paths = collect_inputs(&InputSpec::from(&args.input))?;
            run_backup(&args.safety.request(&args.input))?;

            let config = PipelineConfig {
                special_dirs: args.special_dirs,
                policy: args.policy.into(),
                dry_run: args.safety.dry_run,
            };
            log::info!("Special directories: {}", config.special_dirs.join(", "));
            let report = DedupEngine::new(config).run(&paths);

            if cli.json {
                return print_json(&report);
            }
            print_banner(report.dry_run);
            println!("    - Loaded {} of {} files ({} skipped)", report.load.loaded, report.load.requested, report.load.skipped);
            println!("    - {} unique words in {} entries", report.unique_words, report.entries_before);
            println!("    - Removed {} duplicate word entries", report.entries_removed);
            println!("    - Updated {} JSON files", report.files_modified);
            print_failures(&report.failed_writes);
        }
        Commands::Normalize(args) => {
            let paths = collect_inputs(&InputSpec::from(&args.input))?;
            run_backup(&args.safety.request(&args.input))?;

            let config = PipelineConfig { dry_run: args.safety.dry_run, ..PipelineConfig::default() };
            let report = normalize_paths(&paths, &config);

            if cli.json {
                return print_json(&report);
            }
            print_banner(report.dry_run);
            println!("    - Lowercased {} words", report.words_changed);
            println!("    - Updated {} JSON files", report.files_modified);
            print_failures(&report.failed_writes);
        }
        Commands::Bucket(args) => {
            let paths = json_files_in(&args.dir, args.recursive)?;
            log::info!("Found {} JSON files in {}", paths.len(), args.dir.display());
            let report = write_buckets(&paths, &args.out)
                .with_context(|| format!("failed to write buckets into {}", args.out.display()))?;

            if cli.json {
                return print_json(&report);
            }
            print_banner(false);
            for (path, count) in &report.generated {
                println!("    - {} ({} words)", path.display(), count);
            }
            println!("    - Generated {} files from {} sources", report.generated.len(), report.source_files);
        }
        Commands::Remaining(args) => {
            let report = remaining_words(&args.source, &args.filter_dir)?;
            let written = write_remaining(&args.output, &report.remaining)?;

            if cli.json {
                return print_json(&report);
            }
            print_banner(false);
            println!("    - Source words: {}", report.source_words);
            println!("    - Filter words: {} ({} files)", report.filter_words, report.filter_files);
            println!("    - Remaining:    {}", report.remaining.len());
            if written {
                println!("    - Saved to {}", args.output.display());
            } else {
                println!("    - Every source word is already defined; nothing written");
            }
        }
    }
    Ok(())
}

fn run_backup(request: &BackupRequest) -> Result<()> {
    let outcome = ensure_backup(request, &mut stdin().lock(), &mut stdout(), Local::now())?;
    match outcome {
        BackupOutcome::Created { path, files } => {
            println!("{} '{}' ({} files)", "Backup created:".green(), path.display(), files);
        }
        BackupOutcome::Skipped => {
            println!("{}", "Backup skipped; original files will be modified.".yellow());
        }
        BackupOutcome::NotNeeded => {}
    }
    Ok(())
}

fn print_json<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn print_banner(dry_run: bool) {
    println!("\n{}", "=".repeat(40));
    if dry_run {
        println!("{}", "Dry run finished (nothing written)".cyan().bold());
    } else {
        println!("{}", "All done!".green().bold());
    }
    println!("{}", "=".repeat(40));
}

fn print_failures(failed: &[PathBuf]) {
    for path in failed {
        println!("    - {} {}", "write failed:".red(), path.display());
    }
}
