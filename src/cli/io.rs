//! JSON output for CLI commands

use std::io::{self, Write};

use serde_json::Value;

use super::errors::CliResult;

/// Write a JSON value to stdout, pretty-printed, followed by a newline
pub fn write_json(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    write_json_to(value, &mut stdout)
}

pub(crate) fn write_json_to<W: Write>(value: &Value, writer: &mut W) -> CliResult<()> {
    serde_json::to_writer_pretty(&mut *writer, value)?;
    writeln!(writer)?;
    writer.flush()?;

    Ok(())
}
