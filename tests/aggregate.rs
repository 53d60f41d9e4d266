use std::path::PathBuf;

use ndarray::Array3;

use fmriprep_autoqc::mask::aggregate::{consistent_masks, intersect_masks};
use fmriprep_autoqc::mask::MaskVolume;

mod common;

const EYE: [[f64; 4]; 4] = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

fn mask_path(subject: usize, task: &str) -> PathBuf {
    PathBuf::from(format!(
        "/data/sub-{subject:02}/func/sub-{subject:02}_task-{task}_space-{}_desc-brain_mask.nii.gz",
        common::TEMPLATE
    ))
}

#[test]
fn excluded_masks_are_reported_per_task() {
    let mut masks: Vec<PathBuf> = (0..7).map(|s| mask_path(s, "rest")).collect();
    masks.extend((0..7).map(|s| mask_path(s, "stuff")));

    let (survivors, report) = consistent_masks(&masks, &[1, 2, 10]);
    assert_eq!(survivors.len(), 11);
    assert!(!survivors.contains(&mask_path(1, "rest")));
    assert!(!survivors.contains(&mask_path(2, "rest")));
    assert!(!survivors.contains(&mask_path(3, "stuff")));

    assert_eq!(
        report.get("rest").map(Vec::as_slice),
        Some(&["sub-01_task-rest".to_string(), "sub-02_task-rest".to_string()][..])
    );
    assert_eq!(
        report.get("stuff").map(Vec::as_slice),
        Some(&["sub-03_task-stuff".to_string()][..])
    );
}

#[test]
fn tasks_without_exclusions_have_no_report_entry() {
    let mut masks: Vec<PathBuf> = (0..4).map(|s| mask_path(s, "rest")).collect();
    masks.extend((0..4).map(|s| mask_path(s, "stuff")));

    let (survivors, report) = consistent_masks(&masks, &[0, 1, 2]);
    assert_eq!(survivors.len(), 5);
    assert_eq!(report.get("rest").map(Vec::len), Some(3));
    assert!(!report.contains_key("stuff"));
}

#[test]
fn no_exclusions_keeps_everything() {
    let masks: Vec<PathBuf> = (0..3).map(|s| mask_path(s, "rest")).collect();
    let (survivors, report) = consistent_masks(&masks, &[]);
    assert_eq!(survivors, masks);
    assert!(report.is_empty());
}

fn volume_with(voxels: &[[usize; 3]]) -> MaskVolume {
    let mut data = Array3::<f32>::zeros((4, 4, 4));
    for v in voxels {
        data[[v[0], v[1], v[2]]] = 1.0;
    }
    MaskVolume { data, affine: EYE }
}

#[test]
fn intersection_keeps_majority_voxels() {
    // [0,0,0] in 3/3, [1,1,1] in 2/3, [2,2,2] in 1/3.
    let masks = vec![
        volume_with(&[[0, 0, 0], [1, 1, 1]]),
        volume_with(&[[0, 0, 0], [1, 1, 1]]),
        volume_with(&[[0, 0, 0], [2, 2, 2]]),
    ];
    let group = intersect_masks(&masks).unwrap();
    assert_eq!(group.data[[0, 0, 0]], 1.0);
    assert_eq!(group.data[[1, 1, 1]], 1.0);
    assert_eq!(group.data[[2, 2, 2]], 0.0);
    assert_eq!(group.count_nonzero(), 2);
}

#[test]
fn exactly_half_is_included() {
    let masks = vec![
        volume_with(&[[1, 1, 1]]),
        volume_with(&[[1, 1, 1]]),
        volume_with(&[[0, 0, 0]]),
        volume_with(&[[0, 0, 0]]),
    ];
    let group = intersect_masks(&masks).unwrap();
    // Both voxels sit at exactly 2/4 agreement.
    assert_eq!(group.data[[1, 1, 1]], 1.0);
    assert_eq!(group.data[[0, 0, 0]], 1.0);
}

#[test]
fn zero_masks_is_an_error() {
    assert!(intersect_masks(&[]).is_err());
}

#[test]
fn mixed_grids_are_rejected() {
    let mut shifted = volume_with(&[[0, 0, 0]]);
    shifted.affine[0][3] = 5.0;
    let masks = vec![volume_with(&[[0, 0, 0]]), shifted];
    assert!(intersect_masks(&masks).is_err());
}
