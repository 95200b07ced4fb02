//! sheaf - Snapshot a repository into a single JSON or JSONL file.
//!
//! Usage:
//!   sheaf [DIRECTORY]                 Snapshot DIRECTORY (default: .)
//!   sheaf -f jsonl -o out.jsonl       Write JSON Lines to out.jsonl
//!   sheaf --profile ai_optimized      Use a built-in profile
//!   sheaf --include '^src/' --dry-run List the selected files only
//!   sheaf --profiles                  Show the built-in profiles

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{ArgAction, Parser, ValueEnum};
use color_eyre::eyre::{Context, Result};
use itertools::Itertools;
use strum::IntoEnumIterator;
use tracing::debug;

use sheaf_core::{DEFAULT_IGNORE_FILE, DEFAULT_MAX_FILE_SIZE, DEFAULT_PROFILE, Snapshot};
use sheaf_filter::{DEFAULT_EXCLUDES, Profile};
use sheaf_snapshot::{OutputFormat, SnapshotConfig, Snapshotter, export_to_path};

const ABOUT: &str = "sheaf walks a directory, drops everything a language model does not \
                     need (VCS metadata, virtualenvs, build output, binaries, oversized \
                     files and anything listed in .sheafignore) and writes the remaining \
                     text files with their hashes and token estimates to one JSON or JSONL \
                     document.";

#[derive(Parser)]
#[command(
    name = "sheaf",
    version,
    about = "Snapshot a repository into JSON/JSONL for language models",
    long_about = ABOUT
)]
struct Cli {
    /// Directory to snapshot
    #[arg(default_value = ".")]
    directory: PathBuf,

    /// Output file (defaults to repo_snapshot.<format>)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Built-in profile
    #[arg(long, default_value = DEFAULT_PROFILE)]
    profile: String,

    /// Only keep paths matching this regex (repeatable, replaces the profile's includes)
    #[arg(long = "include", value_name = "REGEX")]
    includes: Vec<String>,

    /// Drop paths matching this regex (repeatable)
    #[arg(long = "exclude", value_name = "REGEX")]
    excludes: Vec<String>,

    /// Skip files larger than this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    max_size: u64,

    /// Maximum directory depth to descend
    #[arg(long)]
    max_depth: Option<u32>,

    /// Descend into excluded directories and filter their files one by one
    #[arg(long)]
    no_prune: bool,

    /// Drop files containing only whitespace
    #[arg(long)]
    skip_blank: bool,

    /// Follow symbolic links
    #[arg(long)]
    follow_symlinks: bool,

    /// Worker threads (0 = one per core, 1 = serial)
    #[arg(short = 'j', long, default_value_t = 0)]
    threads: usize,

    /// List the selected files without writing a snapshot
    #[arg(long)]
    dry_run: bool,

    /// Describe what sheaf does and exit
    #[arg(long)]
    about: bool,

    /// List the built-in profiles and exit
    #[arg(long)]
    profiles: bool,

    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Format {
    #[default]
    Json,
    Jsonl,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Jsonl => OutputFormat::Jsonl,
        }
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;

    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    if cli.about {
        println!("{ABOUT}");
        return Ok(ExitCode::SUCCESS);
    }
    if cli.profiles {
        print_profiles();
        return Ok(ExitCode::SUCCESS);
    }

    run_snapshot(cli)
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose > 1)
        .init();
}

/// Run a snapshot and write it out.
fn run_snapshot(cli: Cli) -> Result<ExitCode> {
    let format = OutputFormat::from(cli.format);
    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format.default_file_name()));

    let mut excludes = cli.excludes.clone();
    if !cli.dry_run {
        if let Some(pattern) = output_exclusion(&cli.directory, &output) {
            debug!(%pattern, "Excluding output file");
            excludes.push(pattern);
        }
    }

    let config = SnapshotConfig::builder()
        .root(cli.directory.clone())
        .profile(cli.profile.clone())
        .includes(cli.includes.clone())
        .excludes(excludes)
        .max_file_size(cli.max_size)
        .max_depth(cli.max_depth)
        .prune_dirs(!cli.no_prune)
        .skip_blank(cli.skip_blank)
        .follow_symlinks(cli.follow_symlinks)
        .threads(cli.threads)
        .build()
        .context("Invalid configuration")?;

    let snapshotter = Snapshotter::new(config);

    if cli.dry_run {
        let selection = snapshotter.select().context("Snapshot failed")?;
        for path in selection.paths() {
            println!("{path}");
        }
        if selection.text.is_empty() {
            eprintln!("No files matched.");
        } else if !cli.quiet {
            eprintln!("{} file(s) selected", selection.text.len());
        }
        return Ok(ExitCode::from(exit_status(selection.text.len())));
    }

    if !cli.quiet {
        eprintln!("Snapshotting {}...", cli.directory.display());
    }
    let snapshot = snapshotter.run().context("Snapshot failed")?;

    if snapshot.is_empty() {
        eprintln!("No files matched; nothing written.");
        return Ok(ExitCode::from(exit_status(0)));
    }

    let bytes = export_to_path(&snapshot, format, &output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    if !cli.quiet {
        print_summary(&snapshot, &output, bytes);
    }

    Ok(ExitCode::SUCCESS)
}

/// Exit status for a run that selected `files` files. An empty result fails.
fn exit_status(files: usize) -> u8 {
    u8::from(files == 0)
}

/// Build an exact-match exclusion for `output` if it lies under `root`.
fn output_exclusion(root: &Path, output: &Path) -> Option<String> {
    let root = root.canonicalize().ok()?;
    let output = std::path::absolute(output).ok()?;
    let file_name = output.file_name()?;
    let parent = output.parent()?;
    let parent = parent.canonicalize().unwrap_or_else(|_| parent.to_path_buf());

    let full = parent.join(file_name);
    let rel = full.strip_prefix(&root).ok()?;
    let rel = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .join("/");

    Some(format!("^{}$", regex::escape(&rel)))
}

fn print_summary(snapshot: &Snapshot, output: &Path, bytes: u64) {
    let meta = &snapshot.meta;
    let skipped = &meta.skipped;

    println!();
    println!("{}", "─".repeat(60));
    println!(" {} -> {}", meta.root_directory.display(), output.display());
    println!("{}", "─".repeat(60));
    println!(" Profile:    {}", meta.profile);
    println!(" Files:      {}", meta.summary.total_files);
    println!(" Characters: {}", meta.summary.total_chars);
    println!(" Tokens:     ~{}", meta.summary.estimated_tokens);
    println!(" Output:     {}", format_size(bytes));
    println!(
        " Skipped:    {} filtered, {} binary, {} too large, {} unreadable, {} blank ({} dirs pruned)",
        skipped.filtered,
        skipped.binary,
        skipped.too_large,
        skipped.unreadable,
        skipped.blank,
        skipped.pruned_dirs
    );
    if meta.ignore_file.present {
        println!(
            " Ignore:     {} ({} patterns, {} negations)",
            meta.ignore_file.file, meta.ignore_file.patterns, meta.ignore_file.negations
        );
    }
    println!("{}", "─".repeat(60));

    if snapshot.has_warnings() {
        println!();
        println!("{} warning(s) during snapshot", snapshot.warnings.len());
        for warning in &snapshot.warnings {
            println!("  {warning}");
        }
    }
}

fn print_profiles() {
    for profile in Profile::iter() {
        println!("{profile}");
        println!("  include: {}", profile.includes().iter().join("  "));
        if !profile.excludes().is_empty() {
            println!("  exclude: {}", profile.excludes().iter().join("  "));
        }
    }
    println!();
    println!(
        "Always excluded ({} patterns, plus {}):",
        DEFAULT_EXCLUDES.len(),
        DEFAULT_IGNORE_FILE
    );
    for pattern in DEFAULT_EXCLUDES {
        println!("  {pattern}");
    }
}

/// Format size in human-readable form.
fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}
