use anyhow::{bail, Result};
use tracing::info;

use crate::bids::{self, BidsIndex, LayoutQuery};
use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage2Index;

impl Stage2Index {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage2Index {
    fn name(&self) -> &'static str {
        "stage2_index"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let index = BidsIndex::build(&ctx.bids_dir)?;

        ctx.subjects = if ctx.participant_label.is_empty() {
            bids::discover_subjects(&ctx.bids_dir)?
        } else {
            bids::normalize_participant_labels(&ctx.participant_label)
        };

        ctx.tasks = if ctx.task_filter.is_empty() {
            index.list_tasks()
        } else {
            ctx.task_filter.clone()
        };
        if ctx.tasks.is_empty() {
            bail!("no tasks found in {}", ctx.bids_dir.display());
        }

        info!(
            subjects = ctx.subjects.len(),
            tasks = ?ctx.tasks,
            "dataset indexed"
        );
        ctx.index = Some(index);
        Ok(())
    }
}
