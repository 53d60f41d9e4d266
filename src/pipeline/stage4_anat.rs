use anyhow::Result;

use crate::ctx::Ctx;
use crate::metrics::anatomical::compute_anat_metrics;
use crate::pipeline::Stage;

pub struct Stage4Anat;

impl Stage4Anat {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage4Anat {
    fn name(&self) -> &'static str {
        "stage4_anat"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let metrics = compute_anat_metrics(
            &ctx.subjects,
            ctx.index()?,
            ctx.reference_masks()?,
            &ctx.standards,
        )?;
        ctx.anat_metrics = Some(metrics);
        Ok(())
    }
}
