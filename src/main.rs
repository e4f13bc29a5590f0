//! sdkgen CLI - Command-line interface
//!
//! Commands:
//!   list     - List every task in the catalog
//!   show     - Print one task's descriptor
//!   check    - Validate a catalog file
//!   schema   - Print the catalog file JSON schema
//!   run      - Run a stage (or the whole pipeline) for tasks

mod cli;

use clap::{ArgAction, Parser, Subcommand};
use cli::run::RunArgs;
use cli::{Context, RunStage};
use sdkgen::{Result, RunSettings};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sdkgen", version)]
#[command(about = "Generate SDK packages from a service catalog with AutoRest", long_about = None)]
struct Cli {
    /// Catalog file (default: built-in catalog)
    #[arg(long, env = "SDKGEN_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Version stamped into generated code
    #[arg(long, env = "SDK_VERSION", global = true)]
    sdk_version: Option<String>,

    /// Local checkout of the specification repository (default: remote root)
    #[arg(long, env = "SPEC_ROOT", global = true)]
    spec_root: Option<String>,

    /// Directory holding the generator executable
    #[arg(long, env = "AUTOREST_ROOT", global = true)]
    autorest_root: Option<PathBuf>,

    /// Workspace root; output goes to <workspace>/src/<module_root>.
    /// When GOPATH lists several entries, the first one is used
    #[arg(long, env = "GOPATH", default_value = ".", global = true)]
    workspace_root: PathBuf,

    /// More log output (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List task names
    List {
        /// Include catalog, version and namespace
        #[arg(short, long)]
        long: bool,

        /// Print full descriptors as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the descriptor of one task as JSON
    Show { task: String },
    /// Validate the catalog file
    Check {
        #[arg(long)]
        json: bool,
    },
    /// Print the JSON schema of the catalog file
    Schema,
    /// Run a stage for the given tasks
    Run {
        #[arg(value_enum)]
        stage: RunStage,

        /// Task names as printed by `list`
        #[arg(required_unless_present = "all")]
        tasks: Vec<String>,

        /// Every task in the catalog
        #[arg(long, conflicts_with = "tasks")]
        all: bool,

        /// Run remaining tasks after a failure and report a summary
        #[arg(long)]
        keep_going: bool,

        /// Print commands instead of executing them
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let ctx = Context {
        config_path: cli.config,
        run: RunSettings {
            sdk_version: cli.sdk_version,
            spec_root: cli.spec_root,
            generator_root: cli.autorest_root,
            workspace_root: first_workspace(&cli.workspace_root),
        },
    };

    match cli.command {
        Commands::List { long, json } => cli::cmd_list(&ctx, long, json),
        Commands::Show { task } => cli::cmd_show(&ctx, &task),
        Commands::Check { json } => cli::cmd_check(&ctx, json),
        Commands::Schema => cli::cmd_schema(),
        Commands::Run {
            stage,
            tasks,
            all,
            keep_going,
            dry_run,
        } => cli::cmd_run(
            &ctx,
            RunArgs {
                stage,
                tasks: &tasks,
                all,
                keep_going,
                dry_run,
            },
        ),
    }
}

/// First entry of a GOPATH-style list, `.` when it is empty
fn first_workspace(root: &Path) -> PathBuf {
    std::env::split_paths(root)
        .find(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `RUST_LOG` wins over the verbosity flags
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("sdkgen={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[cfg(unix)]
    #[test]
    fn test_first_workspace_entry_of_gopath() {
        assert_eq!(
            first_workspace(Path::new("/home/me/go:/opt/go")),
            PathBuf::from("/home/me/go")
        );
        assert_eq!(first_workspace(Path::new("/go")), PathBuf::from("/go"));
        assert_eq!(first_workspace(Path::new("")), PathBuf::from("."));
    }

    #[test]
    fn test_run_requires_tasks_or_all() {
        assert!(Cli::try_parse_from(["sdkgen", "run", "build"]).is_err());
        assert!(Cli::try_parse_from(["sdkgen", "run", "build", "--all"]).is_ok());
        assert!(Cli::try_parse_from(["sdkgen", "run", "build", "arm:compute", "--all"]).is_err());

        let cli = Cli::try_parse_from(["sdkgen", "run", "pipeline", "arm:compute", "--keep-going"])
            .unwrap();
        match cli.command {
            Commands::Run {
                stage,
                tasks,
                keep_going,
                ..
            } => {
                assert_eq!(stage, RunStage::Pipeline);
                assert_eq!(tasks, vec!["arm:compute"]);
                assert!(keep_going);
            }
            _ => panic!("expected run"),
        }
    }
}
