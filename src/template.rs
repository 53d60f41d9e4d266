//! Standard-space template retrieval.
//!
//! Production runs resolve templates from a local TemplateFlow-style
//! directory; the trait keeps the core testable with fake sources.

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use tracing::debug;

/// The standard space every mask is expected to live in.
pub const TEMPLATE: &str = "MNI152NLin2009cAsym";

pub trait TemplateSource {
    /// Path to the canonical reference mask with the given descriptor and
    /// suffix, e.g. `fetch("brain", "mask")`.
    fn fetch(&self, desc: &str, suffix: &str) -> Result<PathBuf>;
}

/// Templates stored under a local directory laid out the TemplateFlow
/// way (`tpl-<name>/tpl-<name>_res-01_desc-<desc>_<suffix>.nii.gz`).
#[derive(Debug)]
pub struct LocalTemplates {
    root: PathBuf,
}

impl LocalTemplates {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Resolve the template directory from the CLI option or the
    /// `TEMPLATEFLOW_HOME` environment variable.
    pub fn resolve(cli_dir: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = cli_dir {
            return Ok(Self::new(dir));
        }
        if let Some(home) = std::env::var_os("TEMPLATEFLOW_HOME") {
            return Ok(Self::new(PathBuf::from(home)));
        }
        bail!("no template directory: pass --template-dir or set TEMPLATEFLOW_HOME");
    }
}

impl TemplateSource for LocalTemplates {
    fn fetch(&self, desc: &str, suffix: &str) -> Result<PathBuf> {
        let stem = format!("tpl-{TEMPLATE}_res-01_desc-{desc}_{suffix}");
        let dirs = [self.root.join(format!("tpl-{TEMPLATE}")), self.root.clone()];
        for dir in &dirs {
            for ext in ["nii.gz", "nii"] {
                let candidate = dir.join(format!("{stem}.{ext}"));
                if candidate.is_file() {
                    debug!(template = %candidate.display(), "template resolved");
                    return Ok(candidate);
                }
            }
        }
        bail!(
            "template {} (desc-{}, {}) not found under {}",
            TEMPLATE,
            desc,
            suffix,
            self.root.display()
        );
    }
}

/// A fixed file standing in for the template registry; used by tests.
#[derive(Debug)]
pub struct FixedTemplate {
    path: PathBuf,
}

impl FixedTemplate {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl TemplateSource for FixedTemplate {
    fn fetch(&self, _desc: &str, _suffix: &str) -> Result<PathBuf> {
        Ok(self.path.clone())
    }
}
