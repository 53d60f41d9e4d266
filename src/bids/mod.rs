//! Filesystem index over an fMRIPrep derivatives tree.
//!
//! The index is built once per run and answers entity/suffix/datatype
//! queries. The core only consumes the narrow [`LayoutQuery`] capability
//! so tests can substitute a fake layout.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

pub mod entities;

/// Key/value filters for one index query. `None` fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub subjects: Option<Vec<String>>,
    pub tasks: Option<Vec<String>>,
    pub session: Option<String>,
    pub space: Option<String>,
    pub desc: Option<String>,
    pub suffix: Option<String>,
    pub extension: Option<String>,
    pub datatype: Option<String>,
}

/// The two capabilities the assessment core needs from a dataset layout.
pub trait LayoutQuery {
    fn query(&self, filter: &QueryFilter) -> Vec<PathBuf>;
    fn list_tasks(&self) -> Vec<String>;
}

#[derive(Debug, Clone)]
struct IndexedFile {
    path: PathBuf,
    name: String,
    datatype: Option<String>,
    suffix: Option<String>,
    extension: Option<String>,
}

#[derive(Debug)]
pub struct BidsIndex {
    files: Vec<IndexedFile>,
}

impl BidsIndex {
    /// Walk `root` and index every regular file. Paths are kept in sorted
    /// order so query results are deterministic.
    pub fn build(root: &Path) -> Result<Self> {
        let mut paths = Vec::new();
        collect_files(root, &mut paths)
            .with_context(|| format!("failed to walk {}", root.display()))?;
        paths.sort();

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let Some(name) = path.file_name().and_then(|s| s.to_str()) else {
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            let (stem, extension) = split_extension(name);
            let suffix = stem
                .rsplit('_')
                .next()
                .filter(|token| !token.contains('-'))
                .map(str::to_string);
            let datatype = path
                .parent()
                .and_then(|p| p.file_name())
                .and_then(|s| s.to_str())
                .map(str::to_string);
            files.push(IndexedFile {
                name: name.to_string(),
                datatype,
                suffix,
                extension: Some(extension.to_string()).filter(|e| !e.is_empty()),
                path,
            });
        }
        debug!(files = files.len(), root = %root.display(), "dataset indexed");
        Ok(Self { files })
    }

    fn matches(&self, file: &IndexedFile, filter: &QueryFilter) -> bool {
        if let Some(subjects) = &filter.subjects {
            match entities::entity_value(&file.name, "sub") {
                Some(sub) if subjects.iter().any(|s| s == sub) => {}
                _ => return false,
            }
        }
        if let Some(tasks) = &filter.tasks {
            match entities::entity_value(&file.name, "task") {
                Some(task) if tasks.iter().any(|t| t == task) => {}
                _ => return false,
            }
        }
        if let Some(session) = &filter.session {
            if entities::entity_value(&file.name, "ses") != Some(session.as_str()) {
                return false;
            }
        }
        if let Some(space) = &filter.space {
            if tag_value(&file.name, "space") != Some(space.as_str()) {
                return false;
            }
        }
        if let Some(desc) = &filter.desc {
            if tag_value(&file.name, "desc") != Some(desc.as_str()) {
                return false;
            }
        }
        if let Some(suffix) = &filter.suffix {
            if file.suffix.as_deref() != Some(suffix.as_str()) {
                return false;
            }
        }
        if let Some(extension) = &filter.extension {
            if file.extension.as_deref() != Some(extension.as_str()) {
                return false;
            }
        }
        if let Some(datatype) = &filter.datatype {
            if file.datatype.as_deref() != Some(datatype.as_str()) {
                return false;
            }
        }
        true
    }
}

impl LayoutQuery for BidsIndex {
    fn query(&self, filter: &QueryFilter) -> Vec<PathBuf> {
        self.files
            .iter()
            .filter(|f| self.matches(f, filter))
            .map(|f| f.path.clone())
            .collect()
    }

    fn list_tasks(&self) -> Vec<String> {
        let tasks: BTreeSet<String> = self
            .files
            .iter()
            .filter_map(|f| entities::entity_value(&f.name, "task"))
            .map(str::to_string)
            .collect();
        tasks.into_iter().collect()
    }
}

/// Subjects requested on the command line, with any `sub-` prefix removed.
pub fn normalize_participant_labels(labels: &[String]) -> Vec<String> {
    labels
        .iter()
        .map(|label| label.strip_prefix("sub-").unwrap_or(label).to_string())
        .collect()
}

/// Enumerate `sub-*` directories under the dataset root. Quicker than a
/// full index query for subject discovery.
pub fn discover_subjects(root: &Path) -> Result<Vec<String>> {
    let mut subjects = Vec::new();
    for entry in
        fs::read_dir(root).with_context(|| format!("failed to read {}", root.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(label) = name.strip_prefix("sub-") {
            subjects.push(label.to_string());
        }
    }
    if subjects.is_empty() {
        bail!("no sub-* directories found under {}", root.display());
    }
    subjects.sort();
    Ok(subjects)
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;
        if file_type.is_dir() {
            collect_files(&path, out)?;
        } else if file_type.is_file() {
            out.push(path);
        }
    }
    Ok(())
}

/// Split a filename at the first dot: `mask.nii.gz` -> (`mask`, `nii.gz`).
fn split_extension(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((stem, ext)) => (stem, ext),
        None => (name, ""),
    }
}

/// Value of a non-vocabulary filename tag such as `space-` or `desc-`.
fn tag_value<'a>(name: &'a str, key: &str) -> Option<&'a str> {
    name.split('_')
        .filter_map(|token| token.split_once('-'))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v.split('.').next().unwrap_or(v))
}
