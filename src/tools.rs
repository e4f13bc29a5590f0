//! External tool invocation
//!
//! Every external step is described as a [`ToolCommand`]: a program plus an
//! argument list, never a shell string. A [`ToolRunner`] executes it and
//! hands back the captured output.

use crate::config::{RunSettings, Settings, ToolSpec};
use crate::descriptor::ServiceDescriptor;
use crate::error::{Error, Result};
use std::fmt;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// A program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn from_spec(spec: &ToolSpec) -> Self {
        Self::new(spec.program.clone()).args(spec.args.iter().cloned())
    }
}

/// Shell-like rendering, for logs and dry runs only
impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(word: &str) -> String {
    let plain = !word.is_empty()
        && word
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@[]+,".contains(c));
    if plain {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', r"'\''"))
    }
}

/// Captured result of a finished process
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    /// Exit code; `None` when terminated by a signal
    pub status: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    pub fn exited(code: i32, stdout: &str, stderr: &str) -> Self {
        Self {
            status: Some(code),
            success: code == 0,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    /// stdout followed by stderr
    pub fn combined(&self) -> String {
        let mut text = self.stdout.clone();
        if !self.stderr.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stderr);
        }
        text
    }

    pub fn status_text(&self) -> String {
        match self.status {
            Some(code) => format!("exit status {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Executes tool commands
pub trait ToolRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<ToolOutput>;
}

impl<R: ToolRunner + ?Sized> ToolRunner for &mut R {
    fn run(&mut self, command: &ToolCommand) -> Result<ToolOutput> {
        (**self).run(command)
    }
}

/// Runs commands as child processes, blocking until each exits
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<ToolOutput> {
        debug!(command = %command, "spawning");

        let output = Command::new(&command.program)
            .args(&command.args)
            .output().map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to launch {}: {}", command.program, e),
            ))
        })?;

        Ok(ToolOutput {
            status: output.status.code(),
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

/// Generator invocation for one descriptor
pub fn generate_command(
    desc: &ServiceDescriptor,
    settings: &Settings,
    run: &RunSettings,
) -> Result<ToolCommand> {
    let sdk_version = run.require_sdk_version()?;
    let executable = path_arg(&run.require_generator_root()?.join(&settings.generator.program));
    let generator = &settings.generator;
    let output_dir = path_arg(&desc.output_path);

    let mut cmd = match &generator.launcher {
        Some(launcher) => ToolCommand::new(launcher.clone()).arg(executable),
        None => ToolCommand::new(executable),
    };
    if generator.add_credentials {
        cmd = cmd.arg("-AddCredentials");
    }

    Ok(cmd.args([
        "-CodeGenerator",
        generator.code_generator.as_str(),
        "-Header",
        generator.header.as_str(),
        "-Input",
        desc.input_path.as_str(),
        "-Namespace",
        desc.namespace.as_str(),
        "-OutputDirectory",
        output_dir.as_str(),
        "-Modeler",
        generator.modeler.as_str(),
        "-pv",
        sdk_version,
    ]))
}

/// Formats the output directory in place
pub fn format_command(desc: &ServiceDescriptor, settings: &Settings) -> ToolCommand {
    ToolCommand::from_spec(&settings.tools.formatter).arg(path_arg(&desc.output_path))
}

pub fn build_command(desc: &ServiceDescriptor, settings: &Settings) -> ToolCommand {
    ToolCommand::from_spec(&settings.tools.compiler).arg(desc.package_path.clone())
}

pub fn lint_command(desc: &ServiceDescriptor, settings: &Settings) -> ToolCommand {
    ToolCommand::from_spec(&settings.tools.linter).arg(desc.package_path.clone())
}

pub fn vet_command(desc: &ServiceDescriptor, settings: &Settings) -> ToolCommand {
    ToolCommand::from_spec(&settings.tools.vet).arg(desc.package_path.clone())
}
