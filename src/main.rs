//! rootscan - Walk every content root of a workspace exactly once.
//!
//! Usage:
//!   rootscan scan <WORKSPACE>    Run an indexing pass and print a report
//!   rootscan plan <WORKSPACE>    Show the deduplicated working set
//!   rootscan --help              Show help

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rootscan_scan::{
    AcceptAll, ExtensionFilter, FailurePolicy, FileEntry, IndexingContext, IndexingOrchestrator,
    IterationConfig, ProgressPhase, RootFilter, RootWalker, VisitFlow, WorkspaceModel,
};

#[derive(Parser)]
#[command(
    name = "rootscan",
    version,
    about = "Walk every content root of a workspace exactly once",
    long_about = "rootscan collects the content roots of a workspace's modules, libraries, \
                  SDKs and custom entities, drops the ones that describe the same content, \
                  and walks the rest."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run an indexing pass over a workspace
    Scan {
        /// Workspace description (TOML)
        workspace: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Abort the pass on the first failing iterator
        #[arg(long)]
        fail_fast: bool,

        /// Walk distinct iterators concurrently
        #[arg(short, long)]
        parallel: bool,

        /// Number of worker threads (0 = auto-detect)
        #[arg(short, long, default_value = "0")]
        threads: usize,

        /// Progress text to announce
        #[arg(long, default_value = "indexing")]
        phase: Phase,

        /// Only visit files with this extension (repeatable)
        #[arg(short = 'e', long = "extension")]
        extensions: Vec<String>,

        /// File name globs to skip (repeatable)
        #[arg(short, long = "ignore")]
        ignore: Vec<String>,

        /// Skip hidden files and directories
        #[arg(long)]
        no_hidden: bool,

        /// Maximum depth below each root
        #[arg(short = 'd', long)]
        max_depth: Option<usize>,

        /// Skip files already visited through another iterator
        #[arg(long)]
        skip_revisited: bool,

        /// Print every visited file
        #[arg(short, long)]
        list: bool,

        /// Extra message catalog (TOML with a [messages] table)
        #[arg(long)]
        messages: Option<PathBuf>,
    },

    /// Show the deduplicated working set without walking it
    Plan {
        /// Workspace description (TOML)
        workspace: PathBuf,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum Phase {
    #[default]
    Indexing,
    Scanning,
}

impl From<Phase> for ProgressPhase {
    fn from(phase: Phase) -> Self {
        match phase {
            Phase::Indexing => ProgressPhase::Indexing,
            Phase::Scanning => ProgressPhase::Scanning,
        }
    }
}

struct ScanArgs {
    format: OutputFormat,
    extensions: Vec<String>,
    list: bool,
    messages: Option<PathBuf>,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Scan {
            workspace,
            format,
            fail_fast,
            parallel,
            threads,
            phase,
            extensions,
            ignore,
            no_hidden,
            max_depth,
            skip_revisited,
            list,
            messages,
        } => {
            let config = IterationConfig::builder()
                .parallel(parallel)
                .threads(threads)
                .failure_policy(if fail_fast {
                    FailurePolicy::FailFast
                } else {
                    FailurePolicy::Isolate
                })
                .phase(ProgressPhase::from(phase))
                .include_hidden(!no_hidden)
                .max_depth(max_depth)
                .ignore_patterns(ignore)
                .skip_revisited_files(skip_revisited)
                .build()
                .context("Invalid scan options")?;

            let args = ScanArgs {
                format,
                extensions,
                list,
                messages,
            };
            if !run_scan(&workspace, config, args)? {
                std::process::exit(1);
            }
        }
        Command::Plan { workspace, format } => {
            run_plan(&workspace, format)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_workspace(path: &Path) -> Result<WorkspaceModel> {
    WorkspaceModel::load(path)
        .with_context(|| format!("Failed to load workspace {}", path.display()))
}

/// Run an indexing pass. Returns whether the pass succeeded.
fn run_scan(path: &Path, config: IterationConfig, args: ScanArgs) -> Result<bool> {
    let model = load_workspace(path)?;

    let mut catalog = model.catalog();
    if let Some(ref messages) = args.messages {
        catalog
            .merge_file(messages)
            .with_context(|| format!("Failed to load messages {}", messages.display()))?;
    }

    let walker = std::sync::Arc::new(RootWalker::new(&config).context("Invalid scan options")?);
    let orchestrator = IndexingOrchestrator::new(config).with_catalog(catalog);

    let mut progress_rx = orchestrator.subscribe();
    let progress = std::thread::spawn(move || {
        loop {
            match progress_rx.blocking_recv() {
                Ok(event) => eprintln!("{}", event.describe()),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    });

    let files = AtomicU64::new(0);
    let list = args.list;
    let visitor = |entry: &FileEntry| {
        if entry.is_file() {
            files.fetch_add(1, Ordering::Relaxed);
            if list {
                println!("{}", entry.path.display());
            }
        }
        VisitFlow::Continue
    };

    let extension_filter;
    let filter: &dyn RootFilter = if args.extensions.is_empty() {
        &AcceptAll
    } else {
        extension_filter = ExtensionFilter::new(args.extensions.iter().map(String::as_str));
        &extension_filter
    };

    let candidates = model.candidates(walker);
    info!(workspace = %model.name, candidates = candidates.len(), "Loaded workspace");

    let context = IndexingContext::new(model.name.as_str());
    let result = orchestrator.run(&context, candidates, &visitor, filter);

    drop(orchestrator);
    if progress.join().is_err() {
        bail!("Progress reporter panicked");
    }

    let report = result.context("Indexing pass failed")?;

    match args.format {
        OutputFormat::Text => {
            println!();
            println!("{}", "─".repeat(70));
            println!(" {} - {}", report.workspace, path.display());
            println!("{}", "─".repeat(70));
            println!();

            for (i, iterator) in report.iterators.iter().enumerate() {
                println!(
                    " {:>3}. {:<40} {:<18} {:>8} entries",
                    i + 1,
                    iterator.debug_name,
                    iterator.state.to_string(),
                    iterator.entries_visited
                );
                if let Some(ref error) = iterator.error {
                    println!("      {error}");
                }
            }

            for failure in &report.origin_failures {
                println!("   -  {:<40} origin failed: {}", failure.debug_name, failure.message);
            }

            println!();
            println!(" {}", report.summary());
            println!(
                " {} files accepted, finished in {:.2}s",
                files.load(Ordering::Relaxed),
                report.duration.as_secs_f64()
            );
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(report.is_success())
}

/// Print the working set without walking it.
fn run_plan(path: &Path, format: OutputFormat) -> Result<()> {
    let model = load_workspace(path)?;
    let config = IterationConfig::default();
    let walker = std::sync::Arc::new(RootWalker::new(&config).context("Invalid scan options")?);
    let orchestrator = IndexingOrchestrator::new(config);

    let context = IndexingContext::new(model.name.as_str());
    let plan = orchestrator
        .plan(&context, model.candidates(walker))
        .context("Failed to plan indexing pass")?;

    match format {
        OutputFormat::Text => {
            println!(
                " Working set for {} ({} iterators)",
                model.name,
                plan.working_set.len()
            );
            println!();
            for (i, item) in plan.working_set.iter().enumerate() {
                println!(" {:>3}. {:<40} {}", i + 1, item.debug_name, item.origin);
                for root in item.origin.roots() {
                    println!("        {}", root.display());
                }
            }

            if !plan.dropped.is_empty() {
                println!();
                println!(" Dropped duplicates:");
                for dropped in &plan.dropped {
                    println!("   {} (same origin as #{})", dropped.debug_name, dropped.kept + 1);
                }
            }

            if !plan.origin_failures.is_empty() {
                println!();
                println!(" Origin failures:");
                for failure in &plan.origin_failures {
                    println!("   {}: {}", failure.debug_name, failure.message);
                }
            }
        }
        OutputFormat::Json => {
            let working_set: Vec<_> = plan
                .working_set
                .iter()
                .map(|item| {
                    serde_json::json!({
                        "debug_name": item.debug_name,
                        "origin": item.origin,
                    })
                })
                .collect();
            let value = serde_json::json!({
                "workspace": model.name,
                "working_set": working_set,
                "dropped": plan.dropped,
                "origin_failures": plan.origin_failures,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}
