use std::path::PathBuf;

use tempfile::TempDir;

use fmriprep_autoqc::mask::affine::check_mask_affine;
use fmriprep_autoqc::mask::load_affine;

mod common;

fn write_set(dir: &TempDir, scales: &[f32]) -> Vec<PathBuf> {
    let data = common::block_mask();
    scales
        .iter()
        .enumerate()
        .map(|(i, scale)| {
            let path = dir.path().join(format!(
                "sub-{i:02}_task-rest_space-{}_desc-brain_mask.nii.gz",
                common::TEMPLATE
            ));
            common::write_mask(&path, &data, *scale, [0.0; 3]);
            path
        })
        .collect()
}

#[test]
fn uniform_grids_pass_unflagged() {
    let dir = TempDir::new().unwrap();
    let masks = write_set(&dir, &[1.0, 1.0, 1.0]);
    assert_eq!(check_mask_affine(&masks).unwrap(), None);
}

#[test]
fn minority_grids_are_flagged_in_order() {
    let dir = TempDir::new().unwrap();
    let masks = write_set(&dir, &[1.0, 1.0, 1.0, 1.0, 2.0, 3.0]);
    assert_eq!(check_mask_affine(&masks).unwrap(), Some(vec![4, 5]));
}

#[test]
fn header_read_recovers_the_written_grid() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("mask.nii.gz");
    common::write_mask(&path, &common::block_mask(), 2.0, [1.0, -3.0, 0.5]);

    let affine = load_affine(&path).unwrap();
    assert_eq!(affine[0], [2.0, 0.0, 0.0, 1.0]);
    assert_eq!(affine[1], [0.0, 2.0, 0.0, -3.0]);
    assert_eq!(affine[2], [0.0, 0.0, 2.0, 0.5]);
    assert_eq!(affine[3], [0.0, 0.0, 0.0, 1.0]);
}

#[test]
fn unreadable_mask_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut masks = write_set(&dir, &[1.0]);
    masks.push(dir.path().join("not-there.nii.gz"));
    assert!(check_mask_affine(&masks).is_err());
}
