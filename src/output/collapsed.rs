//! Folded stack output.
//!
//! One `frame;frame;frame count` line per stack, the input format of
//! external flamegraph tools.

use super::json::prepare_output_path;
use crate::aggregator::CollapsedStack;
use crate::utils::error::OutputError;
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write collapsed stacks to a file
///
/// **Public** - main entry point for folded output
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is invalid
pub fn write_collapsed(
    stacks: &[CollapsedStack],
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing {} collapsed stacks to: {}", stacks.len(), output_path.display());

    prepare_output_path(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);
    write_collapsed_to(stacks, &mut writer).map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    Ok(())
}

/// Write collapsed stacks to any writer
pub fn write_collapsed_to(stacks: &[CollapsedStack], out: &mut impl Write) -> std::io::Result<()> {
    for stack in stacks {
        writeln!(out, "{}", stack.to_line())?;
    }
    Ok(())
}
