//! Functional scan metrics: motion summaries from the confound files and
//! mask overlap against the functional reference.

use anyhow::{bail, Result};
use rayon::prelude::*;
use tracing::info;

use crate::bids::entities::stem_before;
use crate::bids::{LayoutQuery, QueryFilter};
use crate::io::confounds;
use crate::mask::{dice_coefficient, file_name, MaskVolume, ReferenceMasks};
use crate::standards::QcStandards;
use crate::template::TEMPLATE;

use super::{nan_mean, FuncMetricTable};

/// Compute the functional metrics for one task across the requested
/// subjects: mean framewise displacement before and after scrubbing,
/// proportion of frames kept, frame count, and the functional dice score.
pub fn compute_functional_metrics(
    subjects: &[String],
    task: &str,
    index: &dyn LayoutQuery,
    reference: &ReferenceMasks,
    standards: &QcStandards,
) -> Result<FuncMetricTable> {
    let mut table = FuncMetricTable::new();

    let confound_files = index.query(&QueryFilter {
        subjects: Some(subjects.to_vec()),
        tasks: Some(vec![task.to_string()]),
        desc: Some("confounds".to_string()),
        extension: Some("tsv".to_string()),
        ..Default::default()
    });
    info!(task, files = confound_files.len(), "calculating motion QC");
    for file in &confound_files {
        let displacements = confounds::read_framewise_displacement(file)?;
        let total_frames = displacements.len();
        if total_frames == 0 {
            bail!("confounds file has no frames: {}", file.display());
        }
        let mean_fd_raw = nan_mean(displacements.iter().copied());
        // NaN never compares below the threshold, so undefined frames are
        // dropped by scrubbing.
        let kept: Vec<f64> = displacements
            .iter()
            .copied()
            .filter(|fd| *fd < standards.scrubbing_fd)
            .collect();
        let mean_fd_scrubbed = nan_mean(kept.iter().copied());
        let proportion_kept = kept.len() as f64 / total_frames as f64;

        let identifier = stem_before(file_name(file)?, "_desc-confounds").to_string();
        let row = table.entry(identifier).or_default();
        row.mean_fd_raw = Some(mean_fd_raw);
        row.mean_fd_scrubbed = Some(mean_fd_scrubbed);
        row.proportion_kept = Some(proportion_kept);
        row.total_frames = Some(total_frames);
    }

    let func_masks = index.query(&QueryFilter {
        subjects: Some(subjects.to_vec()),
        tasks: Some(vec![task.to_string()]),
        space: Some(TEMPLATE.to_string()),
        desc: Some("brain".to_string()),
        suffix: Some("mask".to_string()),
        extension: Some("nii.gz".to_string()),
        datatype: Some("func".to_string()),
        ..Default::default()
    });
    info!(task, files = func_masks.len(), "calculating functional mask dice");
    let space_tag = format!("_space-{TEMPLATE}");
    let scored: Vec<(String, f64)> = func_masks
        .par_iter()
        .map(|file| {
            let identifier = stem_before(file_name(file)?, &space_tag).to_string();
            let mask = MaskVolume::load(file)?;
            let dice = dice_coefficient(&mask, &reference.func)?;
            Ok((identifier, dice))
        })
        .collect::<Result<_>>()?;
    // Merge rather than overwrite: a scan may already carry motion fields.
    for (identifier, dice) in scored {
        table.entry(identifier).or_default().functional_dice = Some(dice);
    }

    Ok(table)
}
