//! Register summary report generation.
//!
//! Assembles the report object from the loaded inputs and the flattened
//! PDU entries, and writes it as indented JSON.

use crate::loader::LoadedDocument;
use crate::models::{LabelSummary, PduRecord, Report};
use anyhow::{Context, Result};
use chrono::Utc;
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Build the report for this run.
pub fn build_report(cfg: &LoadedDocument, lbl: &LoadedDocument, pdus: Vec<PduRecord>) -> Report {
    Report {
        generated_at: Utc::now(),
        source_cfg: cfg.path.clone(),
        source_lbl: lbl.path.clone(),
        pdus,
        lbl_summary: LabelSummary::from_labels(&lbl.value),
    }
}

/// Generate the report as pretty JSON (2-space indentation).
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Write the report to a file, replacing any previous content.
pub fn write_report(report: &Report, path: &Path) -> Result<()> {
    let content = generate_json_report(report)?;

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write report to {}", path.display()))?;

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
