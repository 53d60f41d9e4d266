use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::mask::AnalysisLevel;

#[derive(Debug, Parser)]
#[command(
    name = "fmriprep-autoqc",
    version,
    about = "Quality control metrics, one TSV report per task, for fMRIPrep processed datasets"
)]
pub struct Cli {
    /// The directory with the input dataset (an fMRIPrep derivative)
    /// formatted according to the BIDS standard.
    pub bids_dir: PathBuf,

    /// The directory where the output reports should be stored.
    pub output_dir: PathBuf,

    /// Level of the analysis that will be performed.
    #[arg(value_enum)]
    pub analysis_level: AnalysisLevelArg,

    /// The label(s) of the participant(s) to analyze, without the `sub-`
    /// prefix (a leading `sub-` is tolerated and stripped). All subjects
    /// are analyzed when omitted.
    #[arg(long, num_args = 1..)]
    pub participant_label: Vec<String>,

    /// The task name(s) to calculate metrics for, without the `task-`
    /// prefix. All tasks found in the dataset when omitted.
    #[arg(long, num_args = 1..)]
    pub task: Vec<String>,

    /// JSON file overriding the built-in QC thresholds. Must carry
    /// exactly the five known keys.
    #[arg(long)]
    pub qc_standards: Option<PathBuf>,

    /// Local template directory (defaults to $TEMPLATEFLOW_HOME).
    #[arg(long)]
    pub template_dir: Option<PathBuf>,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AnalysisLevelArg {
    Participant,
    Group,
}

impl From<AnalysisLevelArg> for AnalysisLevel {
    fn from(arg: AnalysisLevelArg) -> Self {
        match arg {
            AnalysisLevelArg::Participant => AnalysisLevel::Participant,
            AnalysisLevelArg::Group => AnalysisLevel::Group,
        }
    }
}
