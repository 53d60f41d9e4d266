//! Sørensen-Dice overlap between two mask volumes.

use anyhow::Result;

use super::resample::resample_nearest;
use super::{ensure_same_shape, MaskVolume};

/// Dice coefficient `2|A∩B| / (|A| + |B|)` between a processed mask and a
/// reference mask, binarizing both (non-zero = brain).
///
/// When the grids differ the reference is resampled onto the processed
/// mask's grid with nearest-neighbor interpolation. Two empty masks have
/// no defined overlap; the 0/0 division yields NaN and callers are
/// expected to treat NaN as a failed comparison.
pub fn dice_coefficient(processed: &MaskVolume, reference: &MaskVolume) -> Result<f64> {
    let resampled;
    let reference_data = if reference.affine != processed.affine {
        resampled = resample_nearest(reference, processed.shape3(), &processed.affine)?;
        &resampled
    } else {
        ensure_same_shape(processed.shape3(), reference.shape3())?;
        &reference.data
    };

    let mut intersection = 0usize;
    let mut total = 0usize;
    for (a, b) in processed.data.iter().zip(reference_data.iter()) {
        let a = *a != 0.0;
        let b = *b != 0.0;
        if a && b {
            intersection += 1;
        }
        total += usize::from(a) + usize::from(b);
    }
    Ok(2.0 * intersection as f64 / total as f64)
}
