//! Anatomical mask overlap, one score per subject.

use anyhow::{bail, Result};
use tracing::{info, warn};

use crate::bids::{LayoutQuery, QueryFilter};
use crate::mask::{dice_coefficient, MaskVolume, ReferenceMasks};
use crate::standards::QcStandards;
use crate::template::TEMPLATE;

use super::{AnatMetricRow, AnatMetricTable};

/// Compute the anatomical dice score per subject.
///
/// Derivatives produced with an anatomical fast-track have no `anat/`
/// datatype at all; that degrades to an empty table rather than failing
/// the run.
pub fn compute_anat_metrics(
    subjects: &[String],
    index: &dyn LayoutQuery,
    reference: &ReferenceMasks,
    standards: &QcStandards,
) -> Result<AnatMetricTable> {
    let check_anat = index.query(&QueryFilter {
        datatype: Some("anat".to_string()),
        ..Default::default()
    });
    if check_anat.is_empty() {
        warn!("anat/ not present in the derivatives, skipping anatomical QC");
        return Ok(AnatMetricTable::new());
    }

    info!("calculating anatomical dice scores");
    let mut table = AnatMetricTable::new();
    for subject in subjects {
        let masks = index.query(&QueryFilter {
            subjects: Some(vec![subject.clone()]),
            space: Some(TEMPLATE.to_string()),
            desc: Some("brain".to_string()),
            suffix: Some("mask".to_string()),
            extension: Some("nii.gz".to_string()),
            datatype: Some("anat".to_string()),
            ..Default::default()
        });
        let Some(first) = masks.first() else {
            bail!("no anatomical brain mask found for sub-{subject}");
        };
        if masks.len() > 1 {
            warn!(
                subject = %subject,
                found = masks.len(),
                "multiple anatomical brain masks, using the first"
            );
        }
        let mask = MaskVolume::load(first)?;
        let anatomical_dice = dice_coefficient(&mask, &reference.anat)?;
        table.insert(
            subject.clone(),
            AnatMetricRow {
                anatomical_dice,
                pass_qc: anatomical_dice > standards.anatomical_dice,
            },
        );
    }
    Ok(table)
}
