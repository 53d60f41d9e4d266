use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// The exact key set a QC standards file must carry.
pub const EXPECTED_KEYS: [&str; 5] = [
    "anatomical_dice",
    "functional_dice",
    "mean_fd",
    "proportion_kept",
    "scrubbing_fd",
];

/// Numeric pass/fail thresholds for one run.
///
/// Validated eagerly at load time; the thresholds never change after that.
#[derive(Debug, Clone, Deserialize)]
pub struct QcStandards {
    /// Upper bound on the mean framewise displacement of the raw scan (mm).
    pub mean_fd: f64,
    /// Frames at or above this displacement are scrubbed (mm).
    pub scrubbing_fd: f64,
    /// Lower bound on the proportion of frames surviving scrubbing.
    pub proportion_kept: f64,
    /// Lower bound on the anatomical mask dice score.
    pub anatomical_dice: f64,
    /// Lower bound on the functional mask dice score.
    pub functional_dice: f64,
}

impl Default for QcStandards {
    fn default() -> Self {
        Self {
            mean_fd: 0.55,
            scrubbing_fd: 0.2,
            proportion_kept: 0.5,
            anatomical_dice: 0.97,
            functional_dice: 0.89,
        }
    }
}

impl QcStandards {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read QC standards file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("invalid QC standards file {}", path.display()))
    }

    /// Parse a standards file, requiring an exact key-set match.
    pub fn from_json(content: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let Some(map) = value.as_object() else {
            bail!("QC standards must be a JSON object");
        };
        let actual: BTreeSet<&str> = map.keys().map(|k| k.as_str()).collect();
        let expected: BTreeSet<&str> = EXPECTED_KEYS.iter().copied().collect();
        if actual != expected {
            bail!(
                "QC standards keys mismatch: expected {:?}, got {:?}",
                expected,
                actual
            );
        }
        Ok(serde_json::from_value(value)?)
    }
}
