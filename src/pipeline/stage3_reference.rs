use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::mask::build_reference_masks;
use crate::pipeline::Stage;
use crate::template::LocalTemplates;

pub struct Stage3Reference;

impl Stage3Reference {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage3Reference {
    fn name(&self) -> &'static str {
        "stage3_reference"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        let templates = LocalTemplates::resolve(ctx.template_dir.clone())?;
        let (reference, odd_masks) = build_reference_masks(
            ctx.analysis_level,
            &ctx.subjects,
            &ctx.tasks,
            ctx.index()?,
            &templates,
        )?;
        if let Some(odd) = &odd_masks {
            info!(tasks = odd.len(), "scans flagged for inconsistent affines");
        }
        ctx.reference_masks = Some(reference);
        ctx.odd_masks = odd_masks;
        Ok(())
    }
}
