//! Pass/fail decisions over the aggregated metric tables.

use anyhow::{anyhow, Result};
use tracing::info;

use crate::bids::entities::subject_of;
use crate::standards::QcStandards;

use super::{AnatMetricTable, FuncMetricTable};

/// Apply the QC thresholds to a functional metric table, joining in the
/// per-subject anatomical verdicts.
///
/// With no anatomical metrics available, `pass_anat_qc` stays the
/// explicit missing marker and `pass_all_qc` mirrors `pass_func_qc`.
/// A functional scan whose subject is absent from a non-empty anatomical
/// table indicates inconsistent inputs and fails the run.
pub fn apply_quality_assessments(
    functional: &mut FuncMetricTable,
    anatomical: &AnatMetricTable,
    standards: &QcStandards,
) -> Result<()> {
    for row in functional.values_mut() {
        // A missing or NaN metric never passes a conjunct.
        let keep_fd = row.mean_fd_raw.is_some_and(|v| v < standards.mean_fd);
        let keep_proportion = row
            .proportion_kept
            .is_some_and(|v| v > standards.proportion_kept);
        let keep_dice = row
            .functional_dice
            .is_some_and(|v| v > standards.functional_dice);
        row.pass_func_qc = Some(keep_fd && keep_proportion && keep_dice);
    }

    if anatomical.is_empty() {
        for row in functional.values_mut() {
            row.pass_anat_qc = None;
            row.pass_all_qc = row.pass_func_qc;
        }
    } else {
        for (identifier, row) in functional.iter_mut() {
            let subject = subject_of(identifier)
                .ok_or_else(|| anyhow!("identifier '{identifier}' carries no subject entity"))?;
            let anat = anatomical.get(subject).ok_or_else(|| {
                anyhow!("subject '{subject}' missing from the anatomical metrics")
            })?;
            row.anatomical_dice = Some(anat.anatomical_dice);
            row.pass_anat_qc = Some(anat.pass_qc);
            row.pass_all_qc = Some(row.pass_func_qc == Some(true) && anat.pass_qc);
        }
    }

    let total = functional.len();
    let passed = functional
        .values()
        .filter(|row| row.pass_all_qc == Some(true))
        .count();
    let proportion = if total == 0 {
        0.0
    } else {
        passed as f64 / total as f64
    };
    info!(
        passed,
        total,
        proportion = format!("{proportion:.2}"),
        "functional scans passed automatic QC"
    );
    Ok(())
}
