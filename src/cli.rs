//! Command-line interface for docgap.

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use crate::analysis::profiles::{self, DocPlacement};
use crate::config::{self, Config};
use crate::generate::TemplateGenerator;
use crate::patch::{self, LocalWriter, Publisher};
use crate::report;
use crate::scan::Encoding;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Environment variable holding a tracing filter; falls back to `RUST_LOG`.
pub const LOG_ENV: &str = "DOCGAP_LOG";

/// Find undocumented functions and classes.
///
/// docgap scans a source tree in Python, JavaScript, TypeScript, Java, C,
/// C++, Go and Rust, reports every declaration without a doc comment, and
/// can insert generated comment skeletons.
#[derive(Parser)]
#[command(name = "docgap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Report undocumented declarations
    #[command(visible_alias = "check")]
    Scan(ScanArgs),
    /// Write a default configuration file
    Init(InitArgs),
    /// List supported languages
    Languages,
}

/// Arguments for the scan command.
#[derive(Parser)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Extra glob pattern to ignore (repeatable)
    #[arg(long = "ignore", value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Only analyse this language id or extension (repeatable)
    #[arg(long = "lang", value_name = "ID")]
    pub languages: Vec<String>,

    /// Worker threads
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Source encoding: utf-8 or latin-1
    #[arg(long)]
    pub encoding: Option<String>,

    /// Size of the largest-undocumented ranking
    #[arg(long)]
    pub top: Option<usize>,

    /// Print generated doc comments as a diff without changing files
    #[arg(long)]
    pub diff: bool,

    /// Insert generated doc comments into the files
    #[arg(long)]
    pub write: bool,

    /// Exit with status 1 when undocumented declarations are found
    #[arg(long)]
    pub fail_on_undocumented: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "docgap.yaml")]
    pub output: PathBuf,
}

/// Install the stderr log subscriber.
///
/// `DOCGAP_LOG` or `RUST_LOG` take precedence over the verbosity flag.
pub fn init_logging(verbosity: u8) {
    let filter = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|spec| EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| {
            let level = match verbosity {
                0 => "warn",
                1 => "info",
                _ => "debug",
            };
            EnvFilter::new(level)
        });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Merge command-line overrides into the loaded configuration.
fn apply_overrides(config: &mut Config, args: &ScanArgs) {
    config.ignore_patterns.extend(args.ignore.iter().cloned());
    if !args.languages.is_empty() {
        config.languages = args.languages.clone();
    }
    if let Some(jobs) = args.jobs {
        config.jobs = Some(jobs);
    }
    if let Some(encoding) = &args.encoding {
        config.encoding = encoding.clone();
    }
    if let Some(top) = args.top {
        config.top = top;
    }
}

fn spinner(enabled: bool, root: &Path) -> Option<ProgressBar> {
    if !enabled {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("  {spinner:.cyan} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(format!("Scanning {}", root.display()));
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

/// Run the scan command.
pub fn run_scan(args: &ScanArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!("Error: invalid format {:?}, must be 'pretty' or 'json'", args.format);
        return Ok(EXIT_ERROR);
    }
    if args.diff && args.format == "json" {
        eprintln!("Error: --diff prints text and cannot be combined with --format json");
        return Ok(EXIT_ERROR);
    }

    let (mut config, config_path) = Config::load(args.config.as_deref())?;
    if let Some(path) = &config_path {
        tracing::info!(config = %path.display(), "loaded configuration");
    }
    apply_overrides(&mut config, args);
    config.validate()?;

    let progress = spinner(args.format == "pretty", &args.path);
    let result = config.runner(&args.path).run();
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }
    let analysis = result?;

    match args.format.as_str() {
        "json" => report::write_json(&analysis, config.top)?,
        _ => report::write_pretty(&analysis, config.top),
    }

    if args.diff || args.write {
        let encoding = Encoding::parse(&config.encoding)
            .ok_or_else(|| anyhow::anyhow!("unsupported encoding {:?}", config.encoding))?;
        let plan = patch::plan_edits(&analysis, &TemplateGenerator);

        if args.diff {
            for file in &plan {
                let full = args.path.join(&file.path);
                let bytes = std::fs::read(&full)
                    .with_context(|| format!("reading {}", full.display()))?;
                let source = encoding
                    .decode(&bytes)
                    .map_err(|e| anyhow::anyhow!("{}: {}", full.display(), e))?;
                print!("{}", patch::render_diff(file, &source));
            }
        }

        if args.write {
            let handle = LocalWriter::new(&args.path)
                .encoding(encoding)
                .apply_patch_and_publish(&plan)?;
            if args.format == "pretty" {
                println!(
                    "  Inserted {} doc comments in {} files",
                    handle.comments_inserted,
                    handle.files_changed.len()
                );
            }
        }
    }

    let summary = &analysis.summary;
    if analysis.cancelled || (summary.files_scanned == 0 && summary.files_failed > 0) {
        return Ok(EXIT_ERROR);
    }
    if args.fail_on_undocumented && analysis.has_undocumented() && !args.write {
        return Ok(EXIT_FAILED);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    std::fs::write(&args.output, config::DEFAULT_TEMPLATE)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to customize for your project", args.output.display());
    println!("  2. Run: docgap scan . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}

/// Run the languages command.
pub fn run_languages() -> anyhow::Result<i32> {
    println!("Supported languages:");
    println!();
    println!("  {:<12} {:<12} {:<10} {}", "ID", "NAME", "DOCS", "EXTENSIONS");
    for profile in profiles::PROFILES {
        let placement = match profile.doc_placement {
            DocPlacement::Preceding => "preceding",
            DocPlacement::FirstInside => "docstring",
        };
        println!(
            "  {:<12} {:<12} {:<10} {}",
            profile.id,
            profile.display_name,
            placement,
            profile.extensions.join(", ")
        );
    }
    Ok(EXIT_SUCCESS)
}
