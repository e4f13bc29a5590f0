//! Stage pipeline
//!
//! Each descriptor goes through delete, generate, format, build, lint and vet
//! in that order. The first four stop the descriptor on failure; lint and vet
//! findings are reported and never fail anything.

use crate::config::{RunSettings, Settings};
use crate::descriptor::ServiceDescriptor;
use crate::error::{Error, Result};
use crate::tools::{
    build_command, format_command, generate_command, lint_command, vet_command, ToolCommand,
    ToolOutput, ToolRunner,
};
use std::fmt;
use std::io;
use tracing::info;

/// One step of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Delete,
    Generate,
    Format,
    Build,
    Lint,
    Vet,
}

impl Stage {
    /// Full pipeline, in execution order
    pub const PIPELINE: [Stage; 6] = [
        Stage::Delete,
        Stage::Generate,
        Stage::Format,
        Stage::Build,
        Stage::Lint,
        Stage::Vet,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Delete => "delete",
            Stage::Generate => "generate",
            Stage::Format => "format",
            Stage::Build => "build",
            Stage::Lint => "lint",
            Stage::Vet => "vet",
        }
    }

    /// Lint and vet only report
    pub fn is_advisory(&self) -> bool {
        matches!(self, Stage::Lint | Stage::Vet)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a multi-descriptor run does after a descriptor fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop at the first failed descriptor
    #[default]
    FailFast,
    /// Run every descriptor, then fail with a summary
    KeepGoing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Completed,
    /// Delete found nothing to remove
    AlreadyAbsent,
    /// Advisory output from lint or vet
    Findings(String),
    /// Dry run: what would have been executed
    Planned(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub task: String,
    pub stage: Stage,
    pub outcome: StageOutcome,
}

/// A stage that stopped its descriptor
#[derive(Debug)]
pub struct StageFailure {
    pub stage: Stage,
    pub error: Error,
}

/// Outcome of the selected stages for one descriptor
#[derive(Debug)]
pub struct TaskReport {
    pub task: String,
    /// Stages that finished, in order, including those before a failure
    pub stages: Vec<StageReport>,
    pub failure: Option<StageFailure>,
}

impl TaskReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }
}

/// Outcome of a multi-descriptor run
#[derive(Debug)]
pub struct BulkReport {
    pub policy: FailurePolicy,
    /// Number of descriptors selected, including ones never reached
    pub total: usize,
    pub tasks: Vec<TaskReport>,
}

impl BulkReport {
    pub fn failed(&self) -> impl Iterator<Item = &TaskReport> {
        self.tasks.iter().filter(|t| !t.is_success())
    }

    pub fn is_success(&self) -> bool {
        self.failed().next().is_none()
    }

    /// Fail-fast runs surface the original error; keep-going runs a summary
    pub fn into_result(self) -> Result<()> {
        let failed: Vec<String> = self.failed().map(|t| t.task.clone()).collect();
        if failed.is_empty() {
            return Ok(());
        }

        match self.policy {
            FailurePolicy::FailFast => {
                let first = self
                    .tasks
                    .into_iter()
                    .find_map(|t| t.failure.map(|f| f.error));
                Err(first.unwrap_or(Error::Bulk {
                    failed,
                    total: self.total,
                }))
            }
            FailurePolicy::KeepGoing => Err(Error::Bulk {
                failed,
                total: self.total,
            }),
        }
    }
}

/// Runs stages for descriptors through a [`ToolRunner`]
pub struct Pipeline<'a, R> {
    settings: &'a Settings,
    run: &'a RunSettings,
    runner: R,
    dry_run: bool,
}

impl<'a, R: ToolRunner> Pipeline<'a, R> {
    pub fn new(settings: &'a Settings, run: &'a RunSettings, runner: R) -> Self {
        Self {
            settings,
            run,
            runner,
            dry_run: false,
        }
    }

    /// Log commands instead of executing them
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn into_runner(self) -> R {
        self.runner
    }

    /// Check run-level inputs the selected stages need before touching anything
    pub fn preflight(&self, stages: &[Stage]) -> Result<()> {
        if stages.contains(&Stage::Generate) {
            self.run.require_sdk_version()?;
            self.run.require_generator_root()?;
        }
        Ok(())
    }

    pub fn run_stage(&mut self, desc: &ServiceDescriptor, stage: Stage) -> Result<StageReport> {
        info!(task = %desc.task_name, %stage, "running stage");

        let outcome = match stage {
            Stage::Delete => self.delete(desc)?,
            Stage::Generate => self.generate(desc)?,
            Stage::Format | Stage::Build | Stage::Lint | Stage::Vet => {
                let command = match stage {
                    Stage::Format => format_command(desc, self.settings),
                    Stage::Build => build_command(desc, self.settings),
                    Stage::Lint => lint_command(desc, self.settings),
                    _ => vet_command(desc, self.settings),
                };
                if stage.is_advisory() {
                    self.advisory(desc, stage, &command)
                } else {
                    self.checked(desc, stage, &command)?
                }
            }
        };

        Ok(StageReport {
            task: desc.task_name.clone(),
            stage,
            outcome,
        })
    }

    /// Run `stages` in the given order, stopping at the first hard failure
    pub fn run_stages(
        &mut self,
        desc: &ServiceDescriptor,
        stages: &[Stage],
    ) -> Result<Vec<StageReport>> {
        stages
            .iter()
            .map(|stage| self.run_stage(desc, *stage))
            .collect()
    }

    pub fn run_pipeline(&mut self, desc: &ServiceDescriptor) -> Result<Vec<StageReport>> {
        self.run_stages(desc, &Stage::PIPELINE)
    }

    /// Run `stages` for one descriptor, keeping the reports of stages that
    /// finished before a failure
    pub fn run_task(&mut self, desc: &ServiceDescriptor, stages: &[Stage]) -> TaskReport {
        let mut report = TaskReport {
            task: desc.task_name.clone(),
            stages: Vec::with_capacity(stages.len()),
            failure: None,
        };

        for &stage in stages {
            match self.run_stage(desc, stage) {
                Ok(stage_report) => report.stages.push(stage_report),
                Err(error) => {
                    info!(task = %desc.task_name, %stage, %error, "task failed");
                    report.failure = Some(StageFailure { stage, error });
                    break;
                }
            }
        }
        report
    }

    /// Run `stages` for each descriptor independently
    pub fn run_bulk(
        &mut self,
        descriptors: &[&ServiceDescriptor],
        stages: &[Stage],
        policy: FailurePolicy,
    ) -> BulkReport {
        let mut tasks = Vec::with_capacity(descriptors.len());

        for desc in descriptors {
            let report = self.run_task(desc, stages);
            let failed = !report.is_success();
            tasks.push(report);
            if failed && policy == FailurePolicy::FailFast {
                break;
            }
        }

        BulkReport {
            policy,
            total: descriptors.len(),
            tasks,
        }
    }

    /// `None` in dry-run mode
    fn execute(&mut self, command: &ToolCommand) -> Result<Option<ToolOutput>> {
        if self.dry_run {
            info!(command = %command, "dry run");
            return Ok(None);
        }
        self.runner.run(command).map(Some)
    }

    fn delete(&self, desc: &ServiceDescriptor) -> Result<StageOutcome> {
        let path = &desc.output_path;
        if self.dry_run {
            return Ok(StageOutcome::Planned(format!("remove {}", path.display())));
        }

        match std::fs::remove_dir_all(path) {
            Ok(()) => Ok(StageOutcome::Completed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(StageOutcome::AlreadyAbsent),
            Err(e) => Err(Error::Io(io::Error::new(
                e.kind(),
                format!("cannot remove {}: {}", path.display(), e),
            ))),
        }
    }

    fn generate(&mut self, desc: &ServiceDescriptor) -> Result<StageOutcome> {
        let command = generate_command(desc, self.settings, self.run)?;
        let output = match self.execute(&command)? {
            Some(output) => output,
            None => return Ok(StageOutcome::Planned(command.to_string())),
        };

        let text = output.combined();
        let marker = &self.settings.fatal_marker;
        let fatal = !marker.is_empty() && text.contains(marker.as_str());
        if fatal || !output.success {
            return Err(Error::Generation {
                task: desc.task_name.clone(),
                output: if text.trim().is_empty() {
                    output.status_text()
                } else {
                    text
                },
            });
        }
        Ok(StageOutcome::Completed)
    }

    /// Non-zero exit is a hard failure
    fn checked(
        &mut self,
        desc: &ServiceDescriptor,
        stage: Stage,
        command: &ToolCommand,
    ) -> Result<StageOutcome> {
        let output = match self.execute(command)? {
            Some(output) => output,
            None => return Ok(StageOutcome::Planned(command.to_string())),
        };

        if !output.success {
            return Err(Error::Tool {
                task: desc.task_name.clone(),
                stage: stage.to_string(),
                status: output.status_text(),
                output: output.combined(),
            });
        }
        Ok(StageOutcome::Completed)
    }

    /// Output, exit status and launch failures are all reported as findings
    fn advisory(&mut self, desc: &ServiceDescriptor, stage: Stage, command: &ToolCommand) -> StageOutcome {
        let findings = match self.execute(command) {
            Ok(Some(output)) => output.combined(),
            Ok(None) => return StageOutcome::Planned(command.to_string()),
            Err(e) => e.to_string(),
        };

        let findings = findings.trim();
        if findings.is_empty() {
            return StageOutcome::Completed;
        }
        info!(task = %desc.task_name, %stage, findings, "advisory output");
        StageOutcome::Findings(findings.to_string())
    }
}
