//! Majority-vote detection of masks whose voxel grid disagrees with the
//! rest of a set.

use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use super::{load_affine, Affine4};

/// Canonical hashable rendering of an affine. Bit-exact: two masks share
/// a key iff every matrix element is bit-for-bit identical.
pub type AffineKey = [u64; 16];

pub fn affine_key(affine: &Affine4) -> AffineKey {
    let mut key = [0u64; 16];
    for (i, row) in affine.iter().enumerate() {
        for (j, v) in row.iter().enumerate() {
            key[i * 4 + j] = v.to_bits();
        }
    }
    key
}

/// Positions (0-based, ascending) of affines differing from the majority
/// grid, or `None` when every affine matches.
///
/// A true frequency tie is resolved toward the first-encountered affine.
/// Ties are unlikely on real data; the choice is deterministic rather
/// than meaningful.
pub fn find_odd_affines(affines: &[Affine4]) -> Option<Vec<usize>> {
    let keys: Vec<AffineKey> = affines.iter().map(affine_key).collect();

    // First-seen order so the tie-break is stable.
    let mut counts: Vec<(AffineKey, usize)> = Vec::new();
    for key in &keys {
        match counts.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 += 1,
            None => counts.push((*key, 1)),
        }
    }
    info!(unique_geometries = counts.len(), "inspected mask affines");
    if counts.len() <= 1 {
        return None;
    }

    let mut majority = counts[0].0;
    let mut best = counts[0].1;
    for (key, count) in &counts[1..] {
        if *count > best {
            majority = *key;
            best = *count;
        }
    }

    let exclude: Vec<usize> = keys
        .iter()
        .enumerate()
        .filter(|(_, key)| **key != majority)
        .map(|(i, _)| i)
        .collect();
    info!(
        excluded = exclude.len(),
        total = keys.len(),
        "masks with a different affine will be ignored"
    );
    Some(exclude)
}

/// Load the affine of each mask file and flag grid outliers.
///
/// Returns `None` when all masks share one grid; otherwise the sorted
/// input positions of the outliers.
pub fn check_mask_affine(masks: &[PathBuf]) -> Result<Option<Vec<usize>>> {
    let mut affines = Vec::with_capacity(masks.len());
    for path in masks {
        affines.push(load_affine(path)?);
    }
    let exclude = find_odd_affines(&affines);
    if let Some(exclude) = &exclude {
        for &i in exclude {
            debug!(
                mask = %masks[i].display(),
                affine = ?affines[i],
                "mask affine differs from the most common grid"
            );
        }
    }
    Ok(exclude)
}
