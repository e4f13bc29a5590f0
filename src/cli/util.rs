//! CLI utility helpers

use sdkgen::{expand_config, GenConfig, Result, RunSettings, ServiceDescriptor};
use serde::Serialize;
use std::path::PathBuf;

/// Inputs shared by every command
#[derive(Debug, Clone)]
pub struct Context {
    /// Catalog file; the built-in catalog when `None`
    pub config_path: Option<PathBuf>,
    pub run: RunSettings,
}

impl Context {
    /// Load the catalog file and expand it
    pub fn load(&self) -> Result<(GenConfig, Vec<ServiceDescriptor>)> {
        let config = GenConfig::load(self.config_path.as_deref())?;
        let descriptors = expand_config(&config, &self.run)?;
        Ok((config, descriptors))
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Indent every line of `text`
pub fn indent(text: &str, prefix: &str) -> String {
    text.lines()
        .map(|line| format!("{}{}", prefix, line))
        .collect::<Vec<_>>()
        .join("\n")
}
