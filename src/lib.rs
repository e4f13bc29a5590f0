// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # sdkgen: catalog-driven SDK generation
//!
//! Drives an external code generator (AutoRest) over a catalog of API
//! specifications, then formats, builds, lints and vets the result.
//!
//! ## Core Concept
//!
//! A **catalog** is a tree of service families. Any node with a `version`
//! is a leaf; every leaf becomes one [`ServiceDescriptor`] carrying the paths
//! and names the external tools need:
//!
//! ```yaml
//! catalogs:
//!   - name: arm
//!     plane: arm
//!     path_prefix: arm-
//!     services:
//!       compute: { version: "2016-03-30" }
//!       resources:
//!         locks: { version: "2016-09-01" }
//! ```
//!
//! expands to the tasks `arm:compute` and `arm:resources:locks`, the second
//! with namespace `arm/resources/locks` and input
//! `<spec root>/arm-resources/locks/2016-09-01/swagger/locks.json`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sdkgen::{expand_config, FailurePolicy, GenConfig, Pipeline, ProcessRunner, RunSettings, Stage};
//!
//! let config = GenConfig::load(None)?;
//! let run = RunSettings {
//!     sdk_version: Some("7.0.0".into()),
//!     generator_root: Some("/opt/autorest".into()),
//!     workspace_root: "/go".into(),
//!     ..Default::default()
//! };
//! let descriptors = expand_config(&config, &run)?;
//! let selected: Vec<_> = descriptors.iter().collect();
//!
//! let mut pipeline = Pipeline::new(&config.settings, &run, ProcessRunner);
//! pipeline
//!     .run_bulk(&selected, &Stage::PIPELINE, FailurePolicy::KeepGoing)
//!     .into_result()?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                                                             │
//! │  catalog file (YAML)                                        │
//! │       │                                                     │
//! │       ├──► GenConfig::load ──► Catalog (validated tree)     │
//! │       │                                                     │
//! │       └──► expand_all ──► Vec<ServiceDescriptor>            │
//! │                                                             │
//! │  per descriptor                                             │
//! │       │                                                     │
//! │       └──► Pipeline: delete → generate → format → build     │
//! │                      → lint → vet (via ToolRunner)          │
//! │                                                             │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod expand;
pub mod pipeline;
pub mod tools;
pub mod validate;

// Re-exports
pub use catalog::{Catalog, CatalogNode, LeafSpec, Plane};
pub use config::{
    render_template, CatalogConfig, GenConfig, GeneratorSettings, RunSettings, Settings,
    ToolSettings, ToolSpec, DEFAULT_CATALOG,
};
pub use descriptor::{derive_descriptor, CatalogScope, DeriveContext, ServiceDescriptor};
pub use error::{Error, Result};
pub use expand::{
    expand_all, expand_catalog, expand_config, find_task, select_tasks, validate_namespaces,
    validate_unique,
};
pub use pipeline::{
    BulkReport, FailurePolicy, Pipeline, Stage, StageFailure, StageOutcome, StageReport,
    TaskReport,
};
pub use tools::{ProcessRunner, ToolCommand, ToolOutput, ToolRunner};
pub use validate::{
    validate_config_file, validate_config_str, ConfigIssue, ConfigValidationResult, Severity,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
