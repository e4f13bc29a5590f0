//! CLI command implementations
//!
//! This module contains all CLI command handlers, organized by category:
//! - `list`: Catalog listing commands (list, show)
//! - `run`: Stage execution (delete, generate, format, build, lint, vet, pipeline)
//! - `config`: Catalog file commands (check, schema)
//! - `util`: Shared loading and output helpers

pub mod config;
pub mod list;
pub mod run;
pub mod util;

// Re-export all command functions for convenient access
pub use config::{cmd_check, cmd_schema};
pub use list::{cmd_list, cmd_show};
pub use run::{cmd_run, RunStage};
pub use util::Context;
