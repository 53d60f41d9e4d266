use anyhow::{bail, Result};
use std::fs;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;

pub struct Stage0Scaffold;

impl Stage0Scaffold {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage0Scaffold {
    fn name(&self) -> &'static str {
        "stage0_scaffold"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        if !ctx.bids_dir.is_dir() {
            bail!(
                "fMRIPrep directory does not exist: {}",
                ctx.bids_dir.display()
            );
        }
        fs::create_dir_all(&ctx.output_dir)?;
        info!(out_dir = %ctx.output_dir.display(), "output_dir_ready");
        Ok(())
    }
}
