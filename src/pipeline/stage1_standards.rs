use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::pipeline::Stage;
use crate::standards::QcStandards;

pub struct Stage1Standards;

impl Stage1Standards {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage1Standards {
    fn name(&self) -> &'static str {
        "stage1_standards"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        ctx.standards = match &ctx.standards_path {
            Some(path) => {
                let standards = QcStandards::load(path)?;
                info!(path = %path.display(), "loaded QC standards");
                standards
            }
            None => {
                info!("using default QC standards");
                QcStandards::default()
            }
        };
        Ok(())
    }
}
