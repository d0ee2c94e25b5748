//! Finding renderers for the supported output formats.

mod json;
mod sarif;
mod text;

use std::io::Write;

use sentryscan_core::Finding;

use crate::OutputFormat;

/// Writes findings to `writer` in the requested format.
pub fn write_findings(
    findings: &[Finding],
    format: OutputFormat,
    writer: &mut dyn Write,
) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => text::write(findings, writer),
        OutputFormat::Json => json::write(findings, writer),
        OutputFormat::Sarif => sarif::write(findings, writer),
    }
}
