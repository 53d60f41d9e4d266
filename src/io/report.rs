//! Tab-separated per-task QC reports.

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

use crate::bids::entities::{column_name, entity_value, ENTITY_ORDER};
use crate::metrics::FuncMetricTable;

/// Textual marker for a value that does not exist for a row.
pub const MISSING: &str = "n/a";

const METRIC_COLUMNS: [&str; 6] = [
    "mean_fd_raw",
    "mean_fd_scrubbed",
    "proportion_kept",
    "total_frames",
    "functional_dice",
    "anatomical_dice",
];

const FLAG_COLUMNS: [&str; 3] = ["pass_func_qc", "pass_anat_qc", "pass_all_qc"];

/// Write one task's report: identifier, the BIDS entity columns present
/// in at least one row, the numeric metrics, the pass/fail flags, and
/// `different_func_affine` for scans flagged by the affine check.
pub fn write_task_report(
    path: &Path,
    table: &FuncMetricTable,
    flagged: &[String],
) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    let mut w = BufWriter::new(file);

    // An entity column exists as soon as any identifier carries it; rows
    // lacking the entity leave the field empty.
    let entity_columns: Vec<&str> = ENTITY_ORDER
        .iter()
        .copied()
        .filter(|key| table.keys().any(|id| entity_value(id, key).is_some()))
        .collect();

    write!(w, "identifier")?;
    for key in &entity_columns {
        write!(w, "\t{}", column_name(key))?;
    }
    for column in METRIC_COLUMNS.iter().chain(FLAG_COLUMNS.iter()) {
        write!(w, "\t{column}")?;
    }
    writeln!(w, "\tdifferent_func_affine")?;

    for (identifier, row) in table {
        write!(w, "{identifier}")?;
        for key in &entity_columns {
            write!(w, "\t{}", entity_value(identifier, key).unwrap_or(""))?;
        }
        write!(w, "\t{}", fmt_float(row.mean_fd_raw))?;
        write!(w, "\t{}", fmt_float(row.mean_fd_scrubbed))?;
        write!(w, "\t{}", fmt_float(row.proportion_kept))?;
        match row.total_frames {
            Some(n) => write!(w, "\t{n}")?,
            None => write!(w, "\t{MISSING}")?,
        }
        write!(w, "\t{}", fmt_float(row.functional_dice))?;
        write!(w, "\t{}", fmt_float(row.anatomical_dice))?;
        write!(w, "\t{}", fmt_bool(row.pass_func_qc))?;
        write!(w, "\t{}", fmt_bool(row.pass_anat_qc))?;
        write!(w, "\t{}", fmt_bool(row.pass_all_qc))?;
        let odd = flagged.iter().any(|f| f == identifier);
        writeln!(w, "\t{odd}")?;
    }

    Ok(())
}

fn fmt_float(value: Option<f64>) -> String {
    match value {
        // `{}` prints the shortest representation that round-trips.
        Some(v) => format!("{v}"),
        None => MISSING.to_string(),
    }
}

fn fmt_bool(value: Option<bool>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => MISSING.to_string(),
    }
}
