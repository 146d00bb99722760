//! POEM - command line tools for polar performance containers.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use poem::{spec, util, KeepPatterns, LoadOptions, PolarNode};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "poem")]
#[command(about = "Inspect, check and edit POEM polar containers", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Enable logging to specified file
    #[arg(long, global = true)]
    log: Option<PathBuf>,

    /// Log debug messages
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a container against the specification version it declares
    Check {
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the declared specification version
    Version { file: PathBuf },
    /// Print the structure of a container as JSON
    Layout {
        file: PathBuf,
        /// Indentation width, compact output when absent
        #[arg(long)]
        indent: Option<usize>,
    },
    /// Describe every polar of a container
    Info { file: PathBuf },
    /// Print the node tree of a container
    Tree { file: PathBuf },
    /// Remove tables that are neither mandatory nor kept
    Clean {
        file: PathBuf,
        /// Glob of table names to keep (repeatable)
        #[arg(short, long)]
        keep: Vec<String>,
        /// Write the result here instead of replacing the input
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Attach a node of one container under a node of another
    Mount {
        /// Container receiving the node
        target: PathBuf,
        /// Path of the receiving node in the target
        target_path: String,
        /// Container providing the node
        source: PathBuf,
        /// Path of the node in the source
        source_path: String,
        /// Write the result here instead of replacing the target
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    if let Some(path) = command_file(&args.command) {
        if !path.exists() {
            eprintln!("Error: Path not found: {}", path.display());
            std::process::exit(1);
        }
    }

    match args.command {
        Command::Check { file, json } => {
            let report = spec::spec_report(&file)
                .with_context(|| format!("Failed to check {}", file.display()))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else if report.is_compliant() {
                println!("{}: compliant with POEM v{}", file.display(), report.version);
            } else {
                println!(
                    "{}: NOT compliant with POEM v{}",
                    file.display(),
                    report.version
                );
                for violation in &report.violations {
                    println!("  [{}] {}", violation.rule, violation.message);
                }
            }
            if !report.is_compliant() {
                std::process::exit(1);
            }
        }
        Command::Version { file } => {
            let version = spec::get_version(&file)
                .with_context(|| format!("Failed to read version of {}", file.display()))?;
            println!("v{}", version);
        }
        Command::Layout { file, indent } => {
            let root = open(&file)?;
            println!("{}", root.layout_string(indent)?);
        }
        Command::Info { file } => {
            let root = open(&file)?;
            print!("{}", util::describe(&root));
        }
        Command::Tree { file } => {
            let root = open(&file)?;
            print!("{}", util::render_tree(&root));
        }
        Command::Clean { file, keep, output } => {
            let keep = KeepPatterns::new(keep.as_slice())?;
            let mut root = open_eager(&file)?;
            let removed = root.clean(&keep);
            let output = output.unwrap_or(file);
            save(&root, &output)?;
            println!("Removed {} tables, written to {}", removed, output.display());
        }
        Command::Mount {
            target,
            target_path,
            source,
            source_path,
            output,
        } => {
            let mut target_root = open_eager(&target)?;
            let source_root = open_eager(&source)?;
            poem::mount_from(&mut target_root, &target_path, &source_root, &source_path)
                .with_context(|| {
                    format!(
                        "Failed to mount {}:{} on {}:{}",
                        source.display(),
                        source_path,
                        target.display(),
                        target_path
                    )
                })?;
            let output = output.unwrap_or(target);
            save(&target_root, &output)?;
            println!("Mounted {} on {}", source_path, target_path);
        }
    }

    Ok(())
}

fn init_logging(args: &Args) -> Result<()> {
    let default_level = if args.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // Set up logging to a file if --log option is provided, stderr otherwise
    if let Some(log_path) = &args.log {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file {}", log_path.display()))?;
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }
    tracing::info!("Starting poem");
    Ok(())
}

fn command_file(command: &Command) -> Option<&Path> {
    match command {
        Command::Check { file, .. }
        | Command::Version { file }
        | Command::Layout { file, .. }
        | Command::Info { file }
        | Command::Tree { file }
        | Command::Clean { file, .. } => Some(file.as_path()),
        Command::Mount { target, .. } => Some(target.as_path()),
    }
}

fn open(path: &Path) -> Result<PolarNode> {
    poem::load_with(path, &LoadOptions::default().validate(false))
        .with_context(|| format!("Failed to load {}", path.display()))
}

/// Payloads are read up front since the output may replace the input file.
fn open_eager(path: &Path) -> Result<PolarNode> {
    poem::load_with(path, &LoadOptions::default().validate(false).eager(true))
        .with_context(|| format!("Failed to load {}", path.display()))
}

fn save(root: &PolarNode, path: &Path) -> Result<()> {
    poem::to_netcdf(root, root.name(), path)
        .with_context(|| format!("Failed to write {}", path.display()))
}
