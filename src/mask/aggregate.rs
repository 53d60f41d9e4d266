//! Reference-mask construction: the fixed anatomical template, and at
//! group level a probabilistic intersection of the per-subject
//! functional masks after removing grid outliers.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use ndarray::Array3;
use tracing::{debug, info};

use crate::bids::entities::{stem_before, task_of};
use crate::bids::{LayoutQuery, QueryFilter};
use crate::template::{TemplateSource, TEMPLATE};

use super::affine::{affine_key, check_mask_affine};
use super::{ensure_same_shape, MaskVolume};

/// Scan identifiers whose mask grid differed from the majority, grouped
/// by task. A task with no flagged scans has no entry.
pub type OddMaskReport = BTreeMap<String, Vec<String>>;

/// The gold-standard comparators for overlap scoring, fixed per run.
#[derive(Debug)]
pub struct ReferenceMasks {
    pub anat: MaskVolume,
    pub func: MaskVolume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisLevel {
    Participant,
    Group,
}

/// Build the reference masks for one run.
///
/// The anatomical reference is always the standard template. The
/// functional reference is a group mask aggregated from the subjects'
/// functional brain masks when running at group level over more than one
/// subject, and the template otherwise.
pub fn build_reference_masks(
    level: AnalysisLevel,
    subjects: &[String],
    tasks: &[String],
    index: &dyn LayoutQuery,
    templates: &dyn TemplateSource,
) -> Result<(ReferenceMasks, Option<OddMaskReport>)> {
    let template_path = templates.fetch("brain", "mask")?;
    let anat = MaskVolume::load(&template_path)?;
    info!(template = TEMPLATE, "retrieved anatomical reference mask");

    if level == AnalysisLevel::Group && subjects.len() > 1 {
        info!("creating dataset level functional brain mask");
        let filter = QueryFilter {
            subjects: Some(subjects.to_vec()),
            tasks: Some(tasks.to_vec()),
            space: Some(TEMPLATE.to_string()),
            desc: Some("brain".to_string()),
            suffix: Some("mask".to_string()),
            extension: Some("nii.gz".to_string()),
            datatype: Some("func".to_string()),
            ..Default::default()
        };
        let func_masks = index.query(&filter);
        debug!(found = func_masks.len(), "functional brain masks");

        let (survivors, odd_report) = match check_mask_affine(&func_masks)? {
            Some(exclude) => {
                let (survivors, report) = consistent_masks(&func_masks, &exclude);
                debug!(remaining = survivors.len(), "masks after exclusion");
                (survivors, Some(report))
            }
            None => (func_masks, None),
        };

        let mut volumes = Vec::with_capacity(survivors.len());
        for path in &survivors {
            volumes.push(MaskVolume::load(path)?);
        }
        let func = intersect_masks(&volumes)?;
        Ok((ReferenceMasks { anat, func }, odd_report))
    } else {
        info!("using standard template as functional scan reference");
        let func = MaskVolume::load(&template_path)?;
        Ok((ReferenceMasks { anat, func }, None))
    }
}

/// Drop the masks at `exclude` positions by file identity and report the
/// excluded scan identifiers grouped by task.
pub fn consistent_masks(
    masks: &[PathBuf],
    exclude: &[usize],
) -> (Vec<PathBuf>, OddMaskReport) {
    let odd: Vec<&PathBuf> = exclude.iter().filter_map(|&i| masks.get(i)).collect();
    let survivors: Vec<PathBuf> = masks
        .iter()
        .filter(|m| !odd.iter().any(|o| *o == *m))
        .cloned()
        .collect();

    let mut report = OddMaskReport::new();
    for path in odd {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let identifier = stem_before(&name, "_space").to_string();
        let task = task_of(&identifier).to_string();
        report.entry(task).or_default().push(identifier);
    }
    (survivors, report)
}

/// Soft intersection of masks sharing one grid: a voxel is brain when at
/// least half of the masks agree, inclusive at exactly half.
pub fn intersect_masks(masks: &[MaskVolume]) -> Result<MaskVolume> {
    let Some(first) = masks.first() else {
        bail!("cannot build a group mask from zero functional masks");
    };
    let shape = first.shape3();
    let affine = first.affine;
    let key = affine_key(&affine);

    let mut counts = Array3::<u32>::zeros(shape);
    for mask in masks {
        if affine_key(&mask.affine) != key {
            bail!("cannot aggregate masks with different affines");
        }
        ensure_same_shape(shape, mask.shape3())?;
        for (count, v) in counts.iter_mut().zip(mask.data.iter()) {
            *count += u32::from(*v != 0.0);
        }
    }

    let n = masks.len() as u32;
    let data = counts.mapv(|count| if 2 * count >= n { 1.0f32 } else { 0.0 });
    Ok(MaskVolume { data, affine })
}
