use anyhow::Result;
use tracing::info;

use crate::ctx::Ctx;
use crate::io::report::write_task_report;
use crate::metrics::assess::apply_quality_assessments;
use crate::metrics::functional::compute_functional_metrics;
use crate::pipeline::Stage;

pub struct Stage5Reports;

impl Stage5Reports {
    pub fn new() -> Self {
        Self
    }
}

impl Stage for Stage5Reports {
    fn name(&self) -> &'static str {
        "stage5_reports"
    }

    fn run(&self, ctx: &mut Ctx) -> Result<()> {
        for task in ctx.tasks.clone() {
            info!(task = %task, "task report started");
            let mut table = compute_functional_metrics(
                &ctx.subjects,
                &task,
                ctx.index()?,
                ctx.reference_masks()?,
                &ctx.standards,
            )?;
            apply_quality_assessments(&mut table, ctx.anat_metrics()?, &ctx.standards)?;

            let flagged = ctx
                .odd_masks
                .as_ref()
                .and_then(|odd| odd.get(&task))
                .cloned()
                .unwrap_or_default();
            let path = ctx.output_dir.join(format!("task-{task}_report.tsv"));
            write_task_report(&path, &table, &flagged)?;
            info!(report = %path.display(), rows = table.len(), "task report written");
            ctx.reports.push(path);
        }
        Ok(())
    }
}
