use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use fmriprep_autoqc::cli::Cli;
use fmriprep_autoqc::ctx::Ctx;
use fmriprep_autoqc::pipeline::Pipeline;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mut ctx = Ctx::new(cli.bids_dir, cli.output_dir, cli.analysis_level.into());
    ctx.participant_label = cli.participant_label;
    ctx.task_filter = cli.task;
    ctx.standards_path = cli.qc_standards;
    ctx.template_dir = cli.template_dir;

    let pipeline = Pipeline::default_stages();
    pipeline.run(&mut ctx)?;

    print_summary(&ctx);
    Ok(())
}

fn print_summary(ctx: &Ctx) {
    println!("fmriprep-autoqc v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "{} subjects, {} tasks assessed",
        ctx.subjects.len(),
        ctx.tasks.len()
    );
    println!("reports:");
    for report in &ctx.reports {
        println!("- {}", report.display());
    }
}
