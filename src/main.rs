use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;
use typedeps::analysis::Analyzer;
use typedeps::config::{get_config_path, load_config, save_config, TypeDepsConfig};
use typedeps::report::{
    format_edges_as_json, format_edges_as_text, format_report_as_json, format_report_as_text,
};

/// Type-to-type dependency reports from bound syntax trees.
#[derive(Parser)]
#[command(
    name = "typedeps",
    version,
    about = "Type-to-type dependency reports from bound syntax trees"
)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze snapshots and print the ranked dependency summary
    Analyze {
        /// Snapshot file, or directory to search for snapshots
        path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
        /// Walk trees in parallel
        #[arg(long)]
        parallel: bool,
        /// Skip trees with resolution errors instead of aborting
        #[arg(long)]
        continue_on_error: bool,
        /// Directory holding `.typedeps/config.json` (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Print every raw reference edge with its source location
    Edges {
        /// Snapshot file, or directory to search for snapshots
        path: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
        /// Directory holding `.typedeps/config.json` (default: current directory)
        #[arg(long)]
        root: Option<PathBuf>,
    },
    /// Write a default configuration file
    Init {
        /// Project path (default: current directory)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Installs a stderr subscriber so stdout carries only the report.
fn init_tracing(verbose: bool) {
    let default = if verbose { "typedeps=debug" } else { "typedeps=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> typedeps::errors::Result<()> {
    match cli.command {
        Commands::Analyze {
            path,
            format,
            parallel,
            continue_on_error,
            root,
        } => {
            let mut config = load_config(&resolve_path(root))?;
            config.parallel |= parallel;
            config.continue_on_error |= continue_on_error;
            let analyzer = Analyzer::new(config);
            let result = analyzer.analyze_path(&path).await?;
            match format {
                Format::Text => print!("{}", format_report_as_text(&result.report)),
                Format::Json => println!("{}", format_report_as_json(&result.report)),
            }
            for failure in &result.failed_trees {
                eprintln!("skipped {}: {}", failure.path, failure.error);
            }
            tracing::info!(
                units = result.unit_count,
                trees = result.tree_count,
                edges = result.edges.len(),
                duration_ms = result.duration_ms,
                "analysis complete"
            );
        }
        Commands::Edges { path, format, root } => {
            let analyzer = Analyzer::open(&resolve_path(root))?;
            let result = analyzer.analyze_path(&path).await?;
            match format {
                Format::Text => print!("{}", format_edges_as_text(&result.edges)),
                Format::Json => println!("{}", format_edges_as_json(&result.edges)),
            }
        }
        Commands::Init { path } => {
            let project_path = resolve_path(path);
            save_config(&project_path, &TypeDepsConfig::default())?;
            println!(
                "Wrote default configuration to {}",
                get_config_path(&project_path).display()
            );
        }
    }
    Ok(())
}

/// Resolves an optional path argument, defaulting to the current directory.
fn resolve_path(path: Option<PathBuf>) -> PathBuf {
    match path {
        Some(p) => p,
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
