use anyhow::Result;
use std::time::Instant;
use tracing::{info, warn};

use crate::ctx::Ctx;

pub mod stage0_scaffold;
pub mod stage1_standards;
pub mod stage2_index;
pub mod stage3_reference;
pub mod stage4_anat;
pub mod stage5_reports;

pub trait Stage {
    fn name(&self) -> &'static str;
    fn run(&self, ctx: &mut Ctx) -> Result<()>;
}

pub struct Pipeline {
    stages: Vec<Box<dyn Stage>>,
}

impl Pipeline {
    pub fn new(stages: Vec<Box<dyn Stage>>) -> Self {
        Self { stages }
    }

    /// The full stage list for one QC run.
    pub fn default_stages() -> Self {
        Self::new(vec![
            Box::new(stage0_scaffold::Stage0Scaffold::new()),
            Box::new(stage1_standards::Stage1Standards::new()),
            Box::new(stage2_index::Stage2Index::new()),
            Box::new(stage3_reference::Stage3Reference::new()),
            Box::new(stage4_anat::Stage4Anat::new()),
            Box::new(stage5_reports::Stage5Reports::new()),
        ])
    }

    pub fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for stage in &self.stages {
            let start = Instant::now();
            info!(stage = stage.name(), "stage started");
            if let Err(err) = stage.run(ctx) {
                let elapsed_ms = start.elapsed().as_millis();
                warn!(
                    stage = stage.name(),
                    elapsed_ms = elapsed_ms as u64,
                    "stage failed"
                );
                return Err(err);
            }
            let elapsed_ms = start.elapsed().as_millis();
            info!(
                stage = stage.name(),
                elapsed_ms = elapsed_ms as u64,
                "stage finished"
            );
        }
        Ok(())
    }
}
