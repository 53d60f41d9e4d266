//! Per-scan and per-subject quality metric tables.
//!
//! Tables are keyed by identifier in a `BTreeMap`, so iteration (and the
//! written reports) are always sorted ascending by identifier.

use std::collections::BTreeMap;

pub mod anatomical;
pub mod assess;
pub mod functional;

/// Metrics for one functional scan. Fields are `None` until the source
/// that provides them has been seen: a scan may contribute a confounds
/// file, a brain mask, or both, and the two merge into one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FuncMetricRow {
    pub mean_fd_raw: Option<f64>,
    pub mean_fd_scrubbed: Option<f64>,
    pub proportion_kept: Option<f64>,
    pub total_frames: Option<usize>,
    pub functional_dice: Option<f64>,
    pub anatomical_dice: Option<f64>,
    pub pass_func_qc: Option<bool>,
    /// `None` after assessment means the dataset had no anatomical
    /// derivatives; the report renders it as the missing marker.
    pub pass_anat_qc: Option<bool>,
    pub pass_all_qc: Option<bool>,
}

pub type FuncMetricTable = BTreeMap<String, FuncMetricRow>;

/// Anatomical metrics for one subject.
#[derive(Debug, Clone, PartialEq)]
pub struct AnatMetricRow {
    pub anatomical_dice: f64,
    pub pass_qc: bool,
}

pub type AnatMetricTable = BTreeMap<String, AnatMetricRow>;

/// Mean ignoring NaN entries; NaN when no finite value exists.
pub(crate) fn nan_mean(values: impl IntoIterator<Item = f64>) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values {
        if !v.is_nan() {
            sum += v;
            count += 1;
        }
    }
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}
