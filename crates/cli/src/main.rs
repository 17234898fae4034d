use anyhow::{bail, Result};
use clap::{ArgAction, Parser, ValueEnum};
use exif_date_rename_core::{
    load_config, validate_directory, walk_directory, ExifMetadataProvider, ExtensionSet,
    FileProcessor, ProcessOptions, RenameOutcome, RenamePlan, RunSummary, WalkObserver,
};
use std::path::{Path, PathBuf};
use tracing::{debug, warn, Level};
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "exif-date-rename", version)]
#[command(about = "Rename photos to PREFIX_YYYYMMDD_HHMMSS.ext using their EXIF capture time")]
#[command(after_help = "Examples:
  exif-date-rename /path/to/photos
  exif-date-rename ~/Pictures/vacation --dry-run
  exif-date-rename . --extensions jpg png heic
  exif-date-rename /photos --prefix vacation --dry-run
  exif-date-rename ~/Pictures -r --prefix trip")]
struct Cli {
    /// Directory containing image files to rename
    directory: PathBuf,

    /// Show what would be renamed without renaming anything
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// File extensions to process [default: png jpg jpeg tiff tif heic]
    #[arg(long, num_args = 1.., value_delimiter = ',', value_name = "EXT")]
    extensions: Option<Vec<String>>,

    /// Prefix for renamed files [default: photo]
    #[arg(long)]
    prefix: Option<String>,

    /// Process all subdirectories as well
    #[arg(short, long, default_value_t = false)]
    recursive: bool,

    /// Read defaults from this TOML file instead of the per-user config
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("exif_date_rename_core={level}").parse()?)
        .add_directive(format!("exif_date_rename={level}").parse()?);
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    validate_directory(&cli.directory)?;

    let config = load_config(cli.config.as_deref())?;
    let prefix = cli.prefix.unwrap_or(config.prefix);
    let extensions = cli
        .extensions
        .map(ExtensionSet::new)
        .unwrap_or(config.extensions);
    let recursive = cli.recursive || config.recursive;
    if extensions.is_empty() {
        bail!("no file extensions to process");
    }
    debug!(%prefix, recursive, dry_run = cli.dry_run, "starting run");

    let options = ProcessOptions {
        prefix,
        extensions,
        dry_run: cli.dry_run,
    };
    let mut processor = FileProcessor::new(ExifMetadataProvider, options)?;

    let summary = match cli.output {
        OutputFormat::Text => {
            print_banner(&cli.directory, processor.options(), recursive);
            let mut reporter = TextReporter;
            let summary =
                walk_directory(&cli.directory, recursive, &mut processor, &mut reporter)?;
            print_summary(&summary);
            summary
        }
        OutputFormat::Json => {
            let mut reporter = JsonReporter;
            let summary =
                walk_directory(&cli.directory, recursive, &mut processor, &mut reporter)?;
            println!("{}", serde_json::to_string(&summary)?);
            summary
        }
    };

    if summary.failed > 0 {
        warn!(failed = summary.failed, "some files could not be renamed");
    }
    Ok(())
}

fn print_banner(directory: &Path, options: &ProcessOptions, recursive: bool) {
    if options.dry_run {
        println!("DRY RUN MODE - No files will be renamed");
        let extensions: Vec<&str> = options.extensions.iter().collect();
        println!(
            "Would process files with extensions: {}",
            extensions.join(", ")
        );
        if recursive {
            println!("Would process recursively in all subdirectories");
        }
        println!();
    }

    println!("Processing images in: {}", directory.display());
    if recursive {
        println!("Mode: Recursive (processing all subdirectories)");
    }
}

fn print_summary(summary: &RunSummary) {
    print!(
        "\nProcessing complete. Processed: {}, Skipped: {}",
        summary.processed, summary.skipped
    );
    if summary.failed > 0 {
        print!(" (rename failures: {})", summary.failed);
    }
    println!();
}

struct TextReporter;

impl WalkObserver for TextReporter {
    fn directory_entered(&mut self, dir: &Path) {
        println!("  Scanning: {}", dir.display());
    }

    fn file_processed(&mut self, plan: &RenamePlan) {
        if let Some(line) = describe(plan) {
            println!("{line}");
        }
    }
}

fn describe(plan: &RenamePlan) -> Option<String> {
    let name = plan.source_name();
    let target = plan.target_name().unwrap_or_default();
    let detail = plan.detail.as_deref().unwrap_or("unknown error");
    let line = match plan.outcome {
        RenameOutcome::Renamed => format!("Renamed: {name} -> {target}"),
        RenameOutcome::WouldRename => format!("Would rename: {name} -> {target}"),
        RenameOutcome::SkippedAlreadyNamed => format!("Already renamed: {name} (skipping)"),
        RenameOutcome::SkippedNoMetadata => match &plan.detail {
            Some(cause) => format!("No capture time found for {name} ({cause}). Skipping."),
            None => format!("No capture time found for {name}. Skipping."),
        },
        RenameOutcome::SkippedUnparseableDate => {
            format!("Could not parse capture time for {name}: {detail}. Skipping.")
        }
        RenameOutcome::SkippedNotAFile => {
            format!("Skipping: {} is not a file.", plan.source.display())
        }
        RenameOutcome::RenameFailed => format!("Failed to rename {name}: {detail}"),
        RenameOutcome::Ignored => return None,
    };
    Some(line)
}

struct JsonReporter;

impl WalkObserver for JsonReporter {
    fn file_processed(&mut self, plan: &RenamePlan) {
        if plan.outcome == RenameOutcome::Ignored {
            return;
        }
        match serde_json::to_string(plan) {
            Ok(line) => println!("{line}"),
            Err(err) => warn!(error = %err, "could not serialize plan"),
        }
    }
}
