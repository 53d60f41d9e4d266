//! Reading the framewise-displacement column out of fMRIPrep confound
//! files (tab-separated, `n/a` for undefined cells).

use std::path::Path;

use anyhow::{bail, Context, Result};

pub const FD_COLUMN: &str = "framewise_displacement";

/// The framewise-displacement series of one scan. Undefined cells (the
/// first frame has no displacement estimate) come back as NaN.
pub fn read_framewise_displacement(path: &Path) -> Result<Vec<f64>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read confounds file {}", path.display()))?;
    let mut lines = content.lines();
    let header = match lines.next() {
        Some(header) => header,
        None => bail!("confounds file is empty: {}", path.display()),
    };
    let column = header
        .split('\t')
        .position(|name| name == FD_COLUMN)
        .with_context(|| {
            format!("column '{}' not found in {}", FD_COLUMN, path.display())
        })?;

    let mut values = Vec::new();
    for (idx, line) in lines.enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let cell = line.split('\t').nth(column).with_context(|| {
            format!("{}:{}: missing column {}", path.display(), idx + 2, column)
        })?;
        values.push(parse_cell(cell).with_context(|| {
            format!("{}:{}: bad {} value", path.display(), idx + 2, FD_COLUMN)
        })?);
    }
    Ok(values)
}

fn parse_cell(cell: &str) -> Result<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("n/a") {
        return Ok(f64::NAN);
    }
    Ok(trimmed.parse()?)
}
