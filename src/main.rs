//! Callscope CLI
//!
//! Inspects callstack sampling captures and prints or exports their
//! bottom-up and top-down call trees.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use callscope::commands::{
    display_schema, display_version, execute_analyze, inspect_capture, validate_args,
    validate_report_file, AnalyzeArgs, ViewKind,
};
use callscope::utils::config::DEFAULT_PRINT_ROWS;

/// Callscope - callstack sampling analysis
#[derive(Parser, Debug)]
#[command(name = "callscope")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate a capture into call trees and print a view
    Analyze {
        /// Capture file to analyze
        capture: PathBuf,

        /// Tree to print
        #[arg(long, value_enum, default_value_t = ViewKind::BottomUp)]
        view: ViewKind,

        /// Merge all threads under shared top-down roots
        #[arg(long)]
        merge_threads: bool,

        /// Keep only samples from this thread (repeatable)
        #[arg(long = "thread")]
        threads: Vec<u32>,

        /// Keep samples at or after this timestamp
        #[arg(long, allow_hyphen_values = true)]
        start_ns: Option<i64>,

        /// Keep samples at or before this timestamp
        #[arg(long, allow_hyphen_values = true)]
        end_ns: Option<i64>,

        /// Show only rows whose name contains this text, with their ancestors
        #[arg(long)]
        search: Option<String>,

        /// Case-insensitive search
        #[arg(long)]
        ignore_case: bool,

        /// Expand every node shallower than this depth
        #[arg(long, conflicts_with = "expand_all")]
        depth: Option<usize>,

        /// Expand every node
        #[arg(long)]
        expand_all: bool,

        /// Maximum rows to print
        #[arg(long, default_value_t = DEFAULT_PRINT_ROWS)]
        rows: usize,

        /// Output path for the JSON report (optional)
        #[arg(long)]
        json: Option<PathBuf>,

        /// Output path for folded stacks (optional)
        #[arg(long)]
        collapsed: Option<PathBuf>,

        /// Number of hot paths in the report
        #[arg(long)]
        top_paths: Option<usize>,

        /// TOML view configuration
        #[arg(long, env = "CALLSCOPE_CONFIG")]
        config: Option<PathBuf>,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Print header, dictionaries and event counts of a capture
    Inspect {
        /// Capture file to inspect
        capture: PathBuf,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display schema information
    Schema {
        /// Show full schema details
        #[arg(long)]
        show: bool,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    // Execute command
    match cli.command {
        Commands::Analyze {
            capture,
            view,
            merge_threads,
            threads,
            start_ns,
            end_ns,
            search,
            ignore_case,
            depth,
            expand_all,
            rows,
            json,
            collapsed,
            top_paths,
            config,
            summary,
        } => {
            let args = AnalyzeArgs {
                capture_file: capture,
                view,
                merge_threads,
                threads,
                start_ns,
                end_ns,
                search,
                ignore_case,
                depth,
                expand_all,
                rows,
                output_json: json,
                output_collapsed: collapsed,
                top_paths,
                config,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Inspect { capture } => {
            inspect_capture(&capture)?;
        }

        Commands::Validate { file } => {
            validate_report_file(&file)?;
        }

        Commands::Schema { show } => {
            display_schema(show);
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
