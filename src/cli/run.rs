//! Stage execution command

use super::util::{indent, Context};
use clap::ValueEnum;
use sdkgen::*;

/// Stage selector on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RunStage {
    Delete,
    Generate,
    Format,
    Build,
    Lint,
    Vet,
    /// Every stage, in order
    Pipeline,
}

impl RunStage {
    pub fn stages(&self) -> &'static [Stage] {
        match self {
            RunStage::Delete => &[Stage::Delete],
            RunStage::Generate => &[Stage::Generate],
            RunStage::Format => &[Stage::Format],
            RunStage::Build => &[Stage::Build],
            RunStage::Lint => &[Stage::Lint],
            RunStage::Vet => &[Stage::Vet],
            RunStage::Pipeline => &Stage::PIPELINE,
        }
    }
}

pub struct RunArgs<'a> {
    pub stage: RunStage,
    pub tasks: &'a [String],
    pub all: bool,
    pub keep_going: bool,
    pub dry_run: bool,
}

pub fn cmd_run(ctx: &Context, args: RunArgs<'_>) -> Result<()> {
    let (config, descriptors) = ctx.load()?;

    let selected: Vec<&ServiceDescriptor> = if args.all {
        descriptors.iter().collect()
    } else if args.tasks.is_empty() {
        return Err("Usage: sdkgen run <stage> <task>... | --all".into());
    } else {
        select_tasks(&descriptors, args.tasks)?
    };

    let stages = args.stage.stages();
    let policy = if args.keep_going {
        FailurePolicy::KeepGoing
    } else {
        FailurePolicy::FailFast
    };

    let mut pipeline =
        Pipeline::new(&config.settings, &ctx.run, ProcessRunner).dry_run(args.dry_run);
    pipeline.preflight(stages)?;

    let report = pipeline.run_bulk(&selected, stages, policy);
    print_report(&report);
    report.into_result()
}

fn print_report(report: &BulkReport) {
    for task in &report.tasks {
        for stage in &task.stages {
            print_stage(stage);
        }
        match &task.failure {
            // Fail-fast errors are printed once by main
            Some(failure) if report.policy == FailurePolicy::FailFast => {
                println!("✗ {} {}", task.task, failure.stage);
            }
            Some(failure) => {
                println!("✗ {} {}: {}", task.task, failure.stage, failure.error);
            }
            None => {}
        }
    }

    if report.total > 1 {
        let failed = report.failed().count();
        println!();
        if failed == 0 {
            println!("✓ {} task(s) completed", report.tasks.len());
        } else {
            let skipped = report.total - report.tasks.len();
            println!(
                "✗ {} failed, {} completed, {} not run",
                failed,
                report.tasks.len() - failed,
                skipped
            );
        }
    }
}

fn print_stage(report: &StageReport) {
    match &report.outcome {
        StageOutcome::Completed => println!("✓ {} {}", report.task, report.stage),
        StageOutcome::AlreadyAbsent => {
            println!("✓ {} {} (nothing to remove)", report.task, report.stage)
        }
        StageOutcome::Findings(text) => {
            println!("⚠ {} {}:", report.task, report.stage);
            println!("{}", indent(text, "    "));
        }
        StageOutcome::Planned(command) => {
            println!("→ {} {}: {}", report.task, report.stage, command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_selector_covers_every_stage() {
        assert_eq!(RunStage::Pipeline.stages(), &Stage::PIPELINE);
        assert_eq!(RunStage::Vet.stages(), &[Stage::Vet]);
    }
}
