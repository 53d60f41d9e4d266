#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array3;
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;

pub const TEMPLATE: &str = "MNI152NLin2009cAsym";

/// Write a small mask volume with a diagonal affine `scale` and the given
/// translation. Gzip compression follows the file extension.
pub fn write_mask(path: &Path, data: &Array3<f32>, scale: f32, translation: [f32; 3]) {
    let mut header = NiftiHeader::default();
    header.pixdim = [1.0, scale, scale, scale, 1.0, 1.0, 1.0, 1.0];
    header.sform_code = 1;
    header.srow_x = [scale, 0.0, 0.0, translation[0]];
    header.srow_y = [0.0, scale, 0.0, translation[1]];
    header.srow_z = [0.0, 0.0, scale, translation[2]];
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    WriterOptions::new(path)
        .reference_header(&header)
        .write_nifti(data)
        .unwrap();
}

/// A 5x5x6 mask with a 2x2x2 foreground block, the shape used across the
/// mask tests.
pub fn block_mask() -> Array3<f32> {
    let mut data = Array3::<f32>::zeros((5, 5, 6));
    for i in 2..4 {
        for j in 2..4 {
            for k in 2..4 {
                data[[i, j, k]] = 1.0;
            }
        }
    }
    data
}

/// Confounds TSV with the given framewise-displacement cells (verbatim,
/// so "n/a" can be injected) and one unrelated column.
pub fn write_confounds(path: &Path, fd_cells: &[&str]) {
    let mut content = String::from("global_signal\tframewise_displacement\n");
    for cell in fd_cells {
        content.push_str(&format!("0.0\t{cell}\n"));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// A minimal fMRIPrep-style derivatives tree: one `rest` run per subject
/// with a confounds file, a functional brain mask and an anatomical brain
/// mask, all on the same unit grid.
pub fn build_dataset(root: &Path, subjects: &[&str]) {
    build_functional_dataset(root, subjects);
    let mask = block_mask();
    for subject in subjects {
        write_mask(
            &root.join(format!(
                "sub-{subject}/anat/sub-{subject}_space-{TEMPLATE}_desc-brain_mask.nii.gz"
            )),
            &mask,
            1.0,
            [0.0; 3],
        );
    }
}

/// The same tree without any `anat/` directories, as produced by an
/// anatomical fast-track run.
pub fn build_functional_dataset(root: &Path, subjects: &[&str]) {
    let mask = block_mask();
    for subject in subjects {
        let func = root.join(format!("sub-{subject}/func"));
        write_confounds(
            &func.join(format!("sub-{subject}_task-rest_desc-confounds_timeseries.tsv")),
            &["n/a", "0.01", "0.02", "0.03"],
        );
        write_mask(
            &func.join(format!(
                "sub-{subject}_task-rest_space-{TEMPLATE}_desc-brain_mask.nii.gz"
            )),
            &mask,
            1.0,
            [0.0; 3],
        );
    }
}

/// A local template directory holding the standard-space brain mask, laid
/// out the TemplateFlow way.
pub fn build_template_dir(root: &Path) -> PathBuf {
    let dir = root.join("templateflow");
    write_mask(
        &dir.join(format!(
            "tpl-{TEMPLATE}/tpl-{TEMPLATE}_res-01_desc-brain_mask.nii.gz"
        )),
        &block_mask(),
        1.0,
        [0.0; 3],
    );
    dir
}
