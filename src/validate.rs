//! Catalog file validation
//!
//! Collects every problem in a catalog file instead of stopping at the
//! first one, for the `check` command.

use crate::catalog::Catalog;
use crate::config::{
    missing_placeholders, GenConfig, RunSettings, CONFIG_VERSION, INPUT_PLACEHOLDERS,
    INPUT_TEMPLATE_KEY, NAMESPACE_PLACEHOLDERS, NAMESPACE_TEMPLATE_KEY,
};
use crate::descriptor::DeriveContext;
use crate::error::Error;
use crate::expand::expand_all;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// Severity level for validation issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A problem found in a catalog file
#[derive(Debug, Clone, Serialize)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub file: String,
    /// Dotted key path inside the file (`arm.resources.locks`,
    /// `settings.input_template`), when the issue has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ConfigIssue {
    pub fn error(code: &str, message: &str, file: &str) -> Self {
        Self::new(Severity::Error, code, message, file)
    }

    pub fn warning(code: &str, message: &str, file: &str) -> Self {
        Self::new(Severity::Warning, code, message, file)
    }

    fn new(severity: Severity, code: &str, message: &str, file: &str) -> Self {
        Self {
            severity,
            code: code.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Issue for a library error; config errors keep their key path
    fn from_error(code: &str, error: &Error, file: &str) -> Self {
        match error {
            Error::Config { path, message } => Self::error(code, message, file).at(path.as_str()),
            other => Self::error(code, &other.to_string(), file),
        }
    }
}

/// Result of catalog validation
#[derive(Debug, Default, Serialize)]
pub struct ConfigValidationResult {
    pub issues: Vec<ConfigIssue>,
    pub catalogs_checked: usize,
    /// Descriptors produced, when every catalog expanded cleanly
    pub descriptor_count: usize,
}

impl ConfigValidationResult {
    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Validate a catalog file on disk
pub fn validate_config_file(path: &Path) -> ConfigValidationResult {
    let file_str = path.display().to_string();

    if !path.exists() {
        let mut result = ConfigValidationResult::default();
        result
            .issues
            .push(ConfigIssue::error("E001", "File does not exist", &file_str));
        return result;
    }

    match std::fs::read_to_string(path) {
        Ok(content) => validate_config_str(&content, &file_str),
        Err(e) => {
            let mut result = ConfigValidationResult::default();
            result.issues.push(ConfigIssue::error(
                "E002",
                &format!("Cannot read file: {}", e),
                &file_str,
            ));
            result
        }
    }
}

/// Validate catalog file contents; `file` labels the issues
pub fn validate_config_str(content: &str, file: &str) -> ConfigValidationResult {
    let mut result = ConfigValidationResult::default();

    let config: GenConfig = match serde_norway::from_str(content) {
        Ok(c) => c,
        Err(e) => {
            result.issues.push(ConfigIssue::error(
                "E003",
                &format!("Invalid YAML: {}", e),
                file,
            ));
            return result;
        }
    };

    if config.version != CONFIG_VERSION {
        result.issues.push(ConfigIssue::error(
            "E004",
            &format!(
                "Unsupported version: {}. Only version {} is supported.",
                config.version, CONFIG_VERSION
            ),
            file,
        ));
    }

    let settings = &config.settings;
    for name in missing_placeholders(&settings.input_template, &INPUT_PLACEHOLDERS) {
        result.issues.push(
            ConfigIssue::error("E005", &format!("input_template is missing {{{}}}", name), file)
                .at(INPUT_TEMPLATE_KEY),
        );
    }
    for name in missing_placeholders(&settings.namespace_template, &NAMESPACE_PLACEHOLDERS) {
        result.issues.push(
            ConfigIssue::error(
                "E006",
                &format!("namespace_template is missing {{{}}}", name),
                file,
            )
            .at(NAMESPACE_TEMPLATE_KEY),
        );
    }

    if config.catalogs.is_empty() {
        result
            .issues
            .push(ConfigIssue::error("E009", "No catalogs defined", file));
    }

    let mut seen_names = HashSet::new();
    let mut catalogs: Vec<Catalog> = Vec::new();
    for raw in &config.catalogs {
        result.catalogs_checked += 1;
        if !seen_names.insert(raw.name.as_str()) {
            result.issues.push(
                ConfigIssue::warning(
                    "W002",
                    &format!("Catalog name '{}' is used more than once", raw.name),
                    file,
                )
                .at(raw.name.as_str()),
            );
        }
        match Catalog::from_config(raw) {
            Ok(catalog) => catalogs.push(catalog),
            Err(e) => result.issues.push(ConfigIssue::from_error("E007", &e, file)),
        }
    }

    if settings.fatal_marker.is_empty() {
        result.issues.push(
            ConfigIssue::warning(
                "W001",
                "fatal_marker is empty; generator output will not be scanned",
                file,
            )
            .at("settings.fatal_marker"),
        );
    }
    if !settings.remote_spec_root.starts_with("https://")
        && !settings.remote_spec_root.starts_with("http://")
    {
        result.issues.push(
            ConfigIssue::warning(
                "W003",
                &format!(
                    "remote_spec_root '{}' is not an http(s) URL",
                    settings.remote_spec_root
                ),
                file,
            )
            .at("settings.remote_spec_root"),
        );
    }

    if catalogs.len() == config.catalogs.len() {
        let run = RunSettings::default();
        let output_root = run.output_root(settings);
        let ctx = DeriveContext {
            settings,
            spec_root: None,
            output_root: &output_root,
        };
        match expand_all(&catalogs, &ctx) {
            Ok(descriptors) => result.descriptor_count = descriptors.len(),
            Err(e) => {
                let code = match &e {
                    Error::DuplicateNamespace { .. } | Error::DuplicateTask(_) => "E008",
                    Error::Config { path, .. } if path == NAMESPACE_TEMPLATE_KEY => "E010",
                    _ => "E007",
                };
                result.issues.push(ConfigIssue::from_error(code, &e, file));
            }
        }
    }

    result
}
