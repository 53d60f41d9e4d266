use std::path::PathBuf;

use anyhow::Context;

use crate::bids::BidsIndex;
use crate::mask::{AnalysisLevel, OddMaskReport, ReferenceMasks};
use crate::metrics::AnatMetricTable;
use crate::standards::QcStandards;

/// Mutable state threaded through the pipeline for one run.
#[derive(Debug)]
pub struct Ctx {
    pub bids_dir: PathBuf,
    pub output_dir: PathBuf,
    pub analysis_level: AnalysisLevel,
    pub participant_label: Vec<String>,
    pub task_filter: Vec<String>,
    pub standards_path: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,

    pub subjects: Vec<String>,
    pub tasks: Vec<String>,
    pub standards: QcStandards,
    pub index: Option<BidsIndex>,
    pub reference_masks: Option<ReferenceMasks>,
    pub odd_masks: Option<OddMaskReport>,
    pub anat_metrics: Option<AnatMetricTable>,
    pub reports: Vec<PathBuf>,
}

impl Ctx {
    pub fn new(bids_dir: PathBuf, output_dir: PathBuf, analysis_level: AnalysisLevel) -> Self {
        Self {
            bids_dir,
            output_dir,
            analysis_level,
            participant_label: Vec::new(),
            task_filter: Vec::new(),
            standards_path: None,
            template_dir: None,
            subjects: Vec::new(),
            tasks: Vec::new(),
            standards: QcStandards::default(),
            index: None,
            reference_masks: None,
            odd_masks: None,
            anat_metrics: None,
            reports: Vec::new(),
        }
    }

    pub fn index(&self) -> anyhow::Result<&BidsIndex> {
        self.index.as_ref().context("dataset index missing")
    }

    pub fn reference_masks(&self) -> anyhow::Result<&ReferenceMasks> {
        self.reference_masks
            .as_ref()
            .context("reference masks missing")
    }

    pub fn anat_metrics(&self) -> anyhow::Result<&AnatMetricTable> {
        self.anat_metrics
            .as_ref()
            .context("anatomical metrics missing")
    }
}
