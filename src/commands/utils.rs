use crate::capture::CaptureModel;
use crate::output::read_report;
use crate::parser::decode;
use crate::utils::config::{REPORT_SCHEMA_VERSION, SUPPORTED_FORMAT_VERSIONS};
use anyhow::{Context, Result};
use std::path::Path;

/// Read and decode a capture file
pub fn load_capture(path: &Path) -> Result<CaptureModel> {
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read capture file {}", path.display()))?;

    let model = decode(&bytes)
        .with_context(|| format!("Failed to decode capture file {}", path.display()))?;

    Ok(model)
}

/// Print the contents of a capture without aggregating it
pub fn inspect_capture(path: &Path) -> Result<()> {
    let model = load_capture(path)?;
    let info = model.info();

    println!("Capture: {}", path.display());
    println!("  Format version: {}", model.header().format_version);
    println!("  Threads:        {}", info.threads().len());
    for (thread_id, name) in info.threads() {
        println!("    [{}] {}", thread_id, name);
    }
    println!("  Modules:        {}", info.modules().len());
    for module in info.modules() {
        println!(
            "    {} {:#x}..{:#x}",
            info.strings().resolve(module.name),
            module.address_range.start,
            module.address_range.end
        );
    }
    println!("  Callstacks:     {}", info.callstack_count());
    println!("  Events:         {}", model.events().len());
    println!("    Samples:      {}", model.samples().len());
    println!("    Timer slices: {}", model.timer_slices().count());
    println!("    Unknown:      {}", model.unknown_event_count());

    match model.time_range() {
        Some((first, last)) => println!(
            "  Time span:      {} ..= {} ns ({} ns)",
            first,
            last,
            last.saturating_sub(first)
        ),
        None => println!("  Time span:      (no samples)"),
    }

    Ok(())
}

/// Validate a JSON report file
pub fn validate_report_file(file_path: &Path) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(file_path)
        .with_context(|| format!("Invalid report file {}", file_path.display()))?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Capture: {}", report.capture_file);
    println!("  Format version: {}", report.format_version);
    println!("  Total samples: {}", report.total_samples);
    if let Some(selection) = &report.selection {
        println!("  Selection: {} ({} samples)", selection.description, selection.sample_count);
    }
    println!("  Bottom-up rows: {}", report.bottom_up.len());
    println!("  Top-down rows: {}", report.top_down.len());
    println!("  Hot paths: {}", report.hot_paths.len());

    Ok(())
}

/// Display schema information
pub fn display_schema(show_details: bool) {
    println!("Callscope Report Schema");
    println!("Current Version: {}", REPORT_SCHEMA_VERSION);
    println!("Capture Formats: {:?}", SUPPORTED_FORMAT_VERSIONS);
    println!();

    if show_details {
        println!("Schema Structure:");
        println!("  version: string          - Report schema version (e.g., '1.0.0')");
        println!("  capture_file: string     - Source capture");
        println!("  format_version: number   - Capture wire format version");
        println!("  total_samples: number    - Samples in the capture");
        println!("  selection: object?       - Present for selection reports");
        println!("    description: string    - Selection predicate");
        println!("    sample_count: number   - Samples kept");
        println!("  bottom_up: array         - Bottom-up rows in pre-order");
        println!("  top_down: array          - Top-down rows in pre-order");
        println!("    depth: number          - 0 for roots");
        println!("    name: string           - Function or thread label");
        println!("    module: string?        - Module of the frame");
        println!("    address: number?       - Frame address");
        println!("    inclusive: number      - Samples through this node");
        println!("    exclusive: number      - Samples executing at this node");
        println!("    percentage: number     - Inclusive share of all samples");
        println!("  hot_paths: array         - Heaviest complete stacks");
        println!("    stack: string          - Folded stack, outermost first");
        println!("    samples: number        - Samples on this stack");
        println!("    percentage: number     - Share of all samples");
        println!("  generated_at: string     - ISO 8601 timestamp");
    } else {
        println!("Use --show for detailed schema information");
    }
}

/// Display version information
pub fn display_version() {
    println!("Callscope v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", REPORT_SCHEMA_VERSION);
    println!();
    println!("Callstack sampling analysis with bottom-up and top-down call trees.");
}
