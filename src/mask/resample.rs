//! Nearest-neighbor resampling between voxel grids.

use anyhow::{bail, Result};
use ndarray::Array3;

use super::{Affine4, MaskVolume};

/// Invert a voxel-to-world affine (last row `0 0 0 1`).
pub fn invert_affine(a: &Affine4) -> Result<Affine4> {
    let m = [
        [a[0][0], a[0][1], a[0][2]],
        [a[1][0], a[1][1], a[1][2]],
        [a[2][0], a[2][1], a[2][2]],
    ];
    let det = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);
    if det.abs() < 1e-12 {
        bail!("affine is singular and cannot be inverted");
    }
    let inv = [
        [
            (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
            (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
            (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
        ],
        [
            (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
            (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
            (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
        ],
        [
            (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
            (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
            (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
        ],
    ];
    let t = [a[0][3], a[1][3], a[2][3]];
    let mut out = [[0.0; 4]; 4];
    for r in 0..3 {
        for c in 0..3 {
            out[r][c] = inv[r][c];
        }
        out[r][3] = -(inv[r][0] * t[0] + inv[r][1] * t[1] + inv[r][2] * t[2]);
    }
    out[3] = [0.0, 0.0, 0.0, 1.0];
    Ok(out)
}

fn apply(a: &Affine4, p: [f64; 3]) -> [f64; 3] {
    let mut out = [0.0; 3];
    for r in 0..3 {
        out[r] = a[r][0] * p[0] + a[r][1] * p[1] + a[r][2] * p[2] + a[r][3];
    }
    out
}

/// Resample `src` onto the given target grid with nearest-neighbor
/// interpolation. Voxels mapping outside the source volume become
/// background. Nearest-neighbor keeps a binary mask binary.
pub fn resample_nearest(
    src: &MaskVolume,
    target_shape: (usize, usize, usize),
    target_affine: &Affine4,
) -> Result<Array3<f32>> {
    let world_to_voxel = invert_affine(&src.affine)?;
    let (nx, ny, nz) = target_shape;
    let src_shape = src.shape3();
    let mut out = Array3::<f32>::zeros((nx, ny, nz));
    for i in 0..nx {
        for j in 0..ny {
            for k in 0..nz {
                let world = apply(target_affine, [i as f64, j as f64, k as f64]);
                let v = apply(&world_to_voxel, world);
                let si = v[0].round();
                let sj = v[1].round();
                let sk = v[2].round();
                if si < 0.0 || sj < 0.0 || sk < 0.0 {
                    continue;
                }
                let (si, sj, sk) = (si as usize, sj as usize, sk as usize);
                if si >= src_shape.0 || sj >= src_shape.1 || sk >= src_shape.2 {
                    continue;
                }
                out[[i, j, k]] = src.data[[si, sj, sk]];
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    const EYE: Affine4 = [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ];

    #[test]
    fn inverse_of_translation() {
        let mut a = EYE;
        a[0][3] = 3.0;
        a[1][3] = -2.0;
        let inv = invert_affine(&a).unwrap();
        let p = apply(&inv, apply(&a, [1.0, 2.0, 3.0]));
        assert!((p[0] - 1.0).abs() < 1e-12);
        assert!((p[1] - 2.0).abs() < 1e-12);
        assert!((p[2] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn identity_grid_resample_is_a_copy() {
        let mut data = Array3::<f32>::zeros((3, 3, 3));
        data[[1, 1, 1]] = 1.0;
        let src = MaskVolume { data: data.clone(), affine: EYE };
        let out = resample_nearest(&src, (3, 3, 3), &EYE).unwrap();
        assert_eq!(out, data);
    }

    #[test]
    fn out_of_bounds_maps_to_background() {
        let mut a = EYE;
        a[0][3] = 10.0; // target grid shifted entirely off the source
        let src = MaskVolume {
            data: Array3::<f32>::ones((2, 2, 2)),
            affine: EYE,
        };
        let out = resample_nearest(&src, (2, 2, 2), &a).unwrap();
        assert!(out.iter().all(|v| *v == 0.0));
    }
}
