//! Brain mask volumes and the geometry/overlap logic built on them.

use std::path::Path;

use anyhow::{bail, Context, Result};
use ndarray::{Array3, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

pub mod affine;
pub mod aggregate;
pub mod dice;
pub mod resample;

pub use aggregate::{build_reference_masks, AnalysisLevel, OddMaskReport, ReferenceMasks};
pub use dice::dice_coefficient;

/// Row-major 4x4 voxel-to-world transform.
pub type Affine4 = [[f64; 4]; 4];

/// A 3D mask and its voxel-to-world transform.
///
/// Volumes are read-only after loading; resampling and aggregation
/// produce new volumes. An all-background mask is a valid mask.
#[derive(Debug, Clone)]
pub struct MaskVolume {
    pub data: Array3<f32>,
    pub affine: Affine4,
}

impl MaskVolume {
    pub fn load(path: &Path) -> Result<Self> {
        let obj = ReaderOptions::new()
            .read_file(path)
            .with_context(|| format!("failed to read NIfTI file {}", path.display()))?;
        let affine = affine_from_header(obj.header());
        let data = obj
            .into_volume()
            .into_ndarray::<f32>()
            .with_context(|| format!("failed to decode volume {}", path.display()))?;
        let ndim = data.ndim();
        let data = data
            .into_dimensionality::<Ix3>()
            .map_err(|_| anyhow::anyhow!("expected a 3D mask, got {}D: {}", ndim, path.display()))?;
        Ok(Self { data, affine })
    }

    pub fn shape3(&self) -> (usize, usize, usize) {
        let s = self.data.shape();
        (s[0], s[1], s[2])
    }

    pub fn count_nonzero(&self) -> usize {
        self.data.iter().filter(|v| **v != 0.0).count()
    }
}

/// Affine transform carried by a header: sform rows when set, then the
/// qform quaternion, then a pixdim diagonal.
pub fn affine_from_header(header: &NiftiHeader) -> Affine4 {
    if header.sform_code > 0 {
        let row = |r: &[f32; 4]| [r[0] as f64, r[1] as f64, r[2] as f64, r[3] as f64];
        [
            row(&header.srow_x),
            row(&header.srow_y),
            row(&header.srow_z),
            [0.0, 0.0, 0.0, 1.0],
        ]
    } else if header.qform_code > 0 {
        qform_affine(header)
    } else {
        let [_, dx, dy, dz, ..] = header.pixdim;
        [
            [dx as f64, 0.0, 0.0, 0.0],
            [0.0, dy as f64, 0.0, 0.0],
            [0.0, 0.0, dz as f64, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]
    }
}

/// Quaternion rotation + spacing + offset per the NIfTI-1 qform rules.
/// `pixdim[0]` is the qfac sign on the z column (0 reads as +1).
fn qform_affine(header: &NiftiHeader) -> Affine4 {
    let b = header.quatern_b as f64;
    let c = header.quatern_c as f64;
    let d = header.quatern_d as f64;
    let a = (1.0 - (b * b + c * c + d * d)).max(0.0).sqrt();

    let qfac = if header.pixdim[0] == 0.0 {
        1.0
    } else {
        header.pixdim[0] as f64
    };
    let dx = header.pixdim[1] as f64;
    let dy = header.pixdim[2] as f64;
    let dz = header.pixdim[3] as f64 * qfac;

    [
        [
            (a * a + b * b - c * c - d * d) * dx,
            2.0 * (b * c - a * d) * dy,
            2.0 * (b * d + a * c) * dz,
            header.quatern_x as f64,
        ],
        [
            2.0 * (b * c + a * d) * dx,
            (a * a + c * c - b * b - d * d) * dy,
            2.0 * (c * d - a * b) * dz,
            header.quatern_y as f64,
        ],
        [
            2.0 * (b * d - a * c) * dx,
            2.0 * (c * d + a * b) * dy,
            (a * a + d * d - b * b - c * c) * dz,
            header.quatern_z as f64,
        ],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Affine of a mask file. Only the header is parsed; voxel data stays
/// unread, so an empty (all-background) mask passes through without
/// complaint and large mask sets scan quickly.
pub fn load_affine(path: &Path) -> Result<Affine4> {
    let header = NiftiHeader::from_file(path)
        .with_context(|| format!("failed to read NIfTI header {}", path.display()))?;
    Ok(affine_from_header(&header))
}

pub(crate) fn file_name(path: &Path) -> Result<&str> {
    path.file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow::anyhow!("path has no usable file name: {}", path.display()))
}

pub(crate) fn ensure_same_shape(a: (usize, usize, usize), b: (usize, usize, usize)) -> Result<()> {
    if a != b {
        bail!("mask shape mismatch: {:?} != {:?}", a, b);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::affine::affine_key;
    use super::*;

    fn plain_header() -> NiftiHeader {
        let mut header = NiftiHeader::default();
        // NiftiHeader::default() sets sform_code/qform_code to 1; these
        // tests need a truly code-less header and opt in explicitly.
        header.sform_code = 0;
        header.qform_code = 0;
        header.pixdim = [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        header
    }

    #[test]
    fn sform_wins_over_qform() {
        let mut header = plain_header();
        header.sform_code = 1;
        header.srow_x = [2.0, 0.0, 0.0, 5.0];
        header.srow_y = [0.0, 2.0, 0.0, 0.0];
        header.srow_z = [0.0, 0.0, 2.0, 0.0];
        header.qform_code = 1;
        header.quatern_d = 1.0;

        let affine = affine_from_header(&header);
        assert_eq!(affine[0], [2.0, 0.0, 0.0, 5.0]);
        assert_eq!(affine[2][2], 2.0);
    }

    #[test]
    fn qform_rotation_is_decoded() {
        // b=c=0, d=1: a half-turn about z, so x and y flip sign.
        let mut header = plain_header();
        header.qform_code = 1;
        header.quatern_d = 1.0;
        header.quatern_x = 3.0;
        header.quatern_y = -2.0;
        header.quatern_z = 7.0;

        let affine = affine_from_header(&header);
        assert!((affine[0][0] + 1.0).abs() < 1e-12);
        assert!((affine[1][1] + 1.0).abs() < 1e-12);
        assert!((affine[2][2] - 1.0).abs() < 1e-12);
        assert_eq!(affine[0][3], 3.0);
        assert_eq!(affine[1][3], -2.0);
        assert_eq!(affine[2][3], 7.0);
    }

    #[test]
    fn identity_qform_matches_the_pixdim_diagonal() {
        let mut with_qform = plain_header();
        with_qform.qform_code = 1;
        let without = plain_header();
        assert_eq!(
            affine_from_header(&with_qform),
            affine_from_header(&without)
        );
    }

    #[test]
    fn qform_only_grids_are_distinguishable() {
        // Two sform-less headers differing only in a qform rotation must
        // not collapse to the same grid key.
        let mut straight = plain_header();
        straight.qform_code = 1;
        let mut rotated = plain_header();
        rotated.qform_code = 1;
        rotated.quatern_d = 1.0;

        let a = affine_from_header(&straight);
        let b = affine_from_header(&rotated);
        assert_ne!(affine_key(&a), affine_key(&b));
    }

    #[test]
    fn negative_qfac_flips_the_z_column() {
        let mut header = plain_header();
        header.qform_code = 1;
        header.pixdim[0] = -1.0;
        let affine = affine_from_header(&header);
        assert!((affine[2][2] + 1.0).abs() < 1e-12);
    }
}
