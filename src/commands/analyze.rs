//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Loads the view configuration
//! 2. Decodes the capture
//! 3. Builds the full-capture trees
//! 4. Applies the sample selection
//! 5. Navigates and prints the chosen view
//! 6. Writes output files

use super::models::AnalyzeArgs;
use super::utils::load_capture;
use crate::aggregator::{
    calculate_hot_paths, calculate_sample_distribution, collapsed_stacks, BuildOptions,
    TopDownGrouping, Tree, TreeKind,
};
use crate::navigation::{visible_rows, RowView, SearchQuery, ViewState};
use crate::output::{render_rows, write_collapsed, write_report, ProfileReport};
use crate::selection::{CallstackViews, SamplePredicate, SelectionStatus};
use crate::utils::config::{load_view_config, ViewConfig};
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::time::Instant;

/// What an analyze run produced
#[derive(Debug, Clone)]
pub struct AnalyzeOutcome {
    /// Samples in the full capture
    pub total_samples: usize,

    /// Selection result, if a selection was requested
    pub selection: Option<SelectionStatus>,

    /// Rows of the chosen view after navigation
    pub rows: Vec<RowView>,
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// # Arguments
/// * `args` - Analyze command arguments
///
/// # Returns
/// The visible rows and selection result, Err with context if any step fails
///
/// # Errors
/// * Configuration file errors
/// * Capture read or decode errors
/// * File write errors
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalyzeOutcome> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.capture_file.display());

    // Step 1: Load configuration
    let config = match &args.config {
        Some(path) => {
            info!("Step 1/6: Loading view configuration from {}...", path.display());
            load_view_config(path).context("Failed to load view configuration")?
        }
        None => {
            info!("Step 1/6: Using default view configuration");
            ViewConfig::default()
        }
    };

    // Step 2: Decode capture
    info!("Step 2/6: Decoding capture...");
    let model = load_capture(&args.capture_file)?;

    debug!(
        "Decoded capture: {} samples, {} callstacks, {} threads",
        model.samples().len(),
        model.info().callstack_count(),
        model.info().threads().len()
    );

    // Step 3: Build full trees
    info!("Step 3/6: Building call trees...");
    let options = build_options(&args, &config);
    let mut views = CallstackViews::new(&model, options);

    // Step 4: Apply selection
    let selection = match selection_predicate(&args) {
        Some(predicate) => {
            info!("Step 4/6: Selecting samples ({})...", predicate.describe());
            Some(views.select(&predicate))
        }
        None => {
            info!("Step 4/6: No selection requested, using all samples");
            None
        }
    };

    let kind = TreeKind::from(args.view);
    let trees = views.active();
    let tree = trees.get(kind);

    let distribution = calculate_sample_distribution(tree);
    info!("Sample distribution: {}", distribution.summary());

    // Step 5: Navigate view
    info!("Step 5/6: Preparing {} view...", kind.label());
    let state = view_state(&args, &config, tree);
    let rows = visible_rows(tree, &state);

    println!("{}", render_rows(&rows, args.rows));

    // Step 6: Write outputs
    info!("Step 6/6: Writing output files...");
    let stacks = collapsed_stacks(tree);

    if let Some(json_path) = &args.output_json {
        let top_paths = args.top_paths.unwrap_or(config.report.top_paths);
        let hot_paths = calculate_hot_paths(&stacks, tree.total_sample_count(), top_paths);

        let mut report = ProfileReport::new(
            args.capture_file.display().to_string(),
            model.header().format_version,
            model.samples().len() as u64,
            &trees.bottom_up,
            &trees.top_down,
            config.report.max_depth,
        )
        .with_hot_paths(hot_paths);

        if let Some(selected) = views.selection() {
            report = report.with_selection(selected.description.clone(), selected.samples.len() as u64);
        }

        write_report(&report, json_path).context("Failed to write JSON report")?;
        info!("✓ Report written to: {}", json_path.display());
    }

    if let Some(collapsed_path) = &args.output_collapsed {
        write_collapsed(&stacks, collapsed_path).context("Failed to write collapsed stacks")?;
        info!("✓ Collapsed stacks written to: {}", collapsed_path.display());
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("CALLSTACK SUMMARY");
        println!("{}", "=".repeat(80));
        println!("Capture:        {}", args.capture_file.display());
        println!("Format version: {}", model.header().format_version);
        println!("Total samples:  {}", model.samples().len());
        if let Some(selected) = views.selection() {
            println!("Selection:      {} ({} samples)", selected.description, selected.samples.len());
        }
        println!("View:           {}", kind.label());
        println!("{}", distribution.summary());
        println!("\nTop stacks:");
        for stack in stacks.iter().take(5) {
            println!("  {:>8}  {}", stack.weight, stack.stack);
        }
        println!("{}", "=".repeat(80));
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(AnalyzeOutcome {
        total_samples: model.samples().len(),
        selection,
        rows,
    })
}

/// Validate analyze arguments before running
///
/// **Public** - called by main.rs before execute_analyze
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if !args.capture_file.exists() {
        bail!("Capture file not found: {}", args.capture_file.display());
    }

    if let (Some(start), Some(end)) = (args.start_ns, args.end_ns) {
        if start > end {
            bail!("--start-ns ({}) must not be greater than --end-ns ({})", start, end);
        }
    }

    if args.depth.is_some() && args.expand_all {
        bail!("--depth and --expand-all cannot be used together");
    }

    if args.top_paths == Some(0) {
        bail!("--top-paths must be greater than 0");
    }

    if let Some(text) = &args.search {
        if text.is_empty() {
            bail!("--search text must not be empty");
        }
    }

    Ok(())
}

/// **Private** - internal helper for execute_analyze
fn build_options(args: &AnalyzeArgs, config: &ViewConfig) -> BuildOptions {
    let grouping = if args.merge_threads || config.aggregation.merge_threads {
        TopDownGrouping::Merged
    } else {
        TopDownGrouping::PerThread
    };

    BuildOptions {
        grouping,
        shard_size: config.aggregation.shard_size,
    }
}

/// Translate selection flags into one predicate
///
/// **Private** - internal helper for execute_analyze
fn selection_predicate(args: &AnalyzeArgs) -> Option<SamplePredicate> {
    let mut predicates = Vec::new();

    if args.start_ns.is_some() || args.end_ns.is_some() {
        predicates.push(SamplePredicate::TimeRange {
            start_ns: args.start_ns.unwrap_or(i64::MIN),
            end_ns: args.end_ns.unwrap_or(i64::MAX),
        });
    }

    match args.threads.as_slice() {
        [] => {}
        [thread_id] => predicates.push(SamplePredicate::Thread(*thread_id)),
        threads => predicates.push(SamplePredicate::Threads(threads.iter().copied().collect())),
    }

    match predicates.len() {
        0 => None,
        1 => predicates.pop(),
        _ => Some(SamplePredicate::All(predicates)),
    }
}

/// **Private** - internal helper for execute_analyze
fn view_state(args: &AnalyzeArgs, config: &ViewConfig, tree: &Tree) -> ViewState {
    let mut state = ViewState::new();

    if args.expand_all {
        state.expand_all(tree);
    } else if let Some(depth) = args.depth {
        state.expand_to_depth(tree, depth);
    }

    if let Some(text) = &args.search {
        let case_sensitive = !args.ignore_case && config.search.case_sensitive;
        state.set_search(SearchQuery::new(text.clone()).with_case_sensitivity(case_sensitive));
    }

    state
}
