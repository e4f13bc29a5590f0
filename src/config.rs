//! sdkgen configuration
//!
//! Handles loading of the catalog file (service catalogs plus generation
//! settings) and the run-level inputs that come from the command line or
//! the environment.

use crate::catalog::{Catalog, Plane};
use crate::error::{Error, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Only supported catalog file schema version
pub const CONFIG_VERSION: u32 = 1;

/// Catalog shipped with the binary, used when no file is given
pub const DEFAULT_CATALOG: &str = include_str!("../catalog/azure.yaml");

/// Label used in messages for the built-in catalog
pub const DEFAULT_CATALOG_LABEL: &str = "<built-in catalog>";

/// Catalog file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GenConfig {
    /// Schema version for migrations
    pub version: u32,

    /// Generation settings shared by every catalog
    #[serde(default)]
    pub settings: Settings,

    /// Catalogs, expanded in this order
    pub catalogs: Vec<CatalogConfig>,
}

/// One top-level catalog as written in the file
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogConfig {
    pub name: String,

    pub plane: Plane,

    /// Prefix for the specification folder (e.g. `arm-`)
    #[serde(default)]
    pub path_prefix: String,

    /// Service tree: a mapping holding `version` is a leaf, anything else a group
    #[schemars(with = "BTreeMap<String, serde_json::Value>")]
    pub services: serde_norway::Mapping,
}

/// Settings applied to every descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Settings {
    /// Specification root used when no local root is configured
    #[serde(default = "default_remote_spec_root")]
    pub remote_spec_root: String,

    /// Input pattern: {root}, {prefix}, {fullname}, {version}, {swagger}
    #[serde(default = "default_input_template")]
    pub input_template: String,

    /// Namespace pattern: {plane}, {fullname}
    #[serde(default = "default_namespace_template")]
    pub namespace_template: String,

    /// Import path of the generated module tree
    #[serde(default = "default_module_root")]
    pub module_root: String,

    /// Substring that marks a generator run as failed
    #[serde(default = "default_fatal_marker")]
    pub fatal_marker: String,

    #[serde(default)]
    pub generator: GeneratorSettings,

    #[serde(default)]
    pub tools: ToolSettings,
}

fn default_remote_spec_root() -> String {
    "https://raw.githubusercontent.com/Azure/azure-rest-api-specs/master".to_string()
}

fn default_input_template() -> String {
    "{root}/{prefix}{fullname}/{version}/swagger/{swagger}.json".to_string()
}

fn default_namespace_template() -> String {
    "{plane}/{fullname}".to_string()
}

fn default_module_root() -> String {
    "github.com/Azure/azure-sdk-for-go".to_string()
}

fn default_fatal_marker() -> String {
    "[FATAL]".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            remote_spec_root: default_remote_spec_root(),
            input_template: default_input_template(),
            namespace_template: default_namespace_template(),
            module_root: default_module_root(),
            fatal_marker: default_fatal_marker(),
            generator: GeneratorSettings::default(),
            tools: ToolSettings::default(),
        }
    }
}

/// Fixed parameters of the generator invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GeneratorSettings {
    /// Executable, relative to the generator root
    #[serde(default = "default_generator_program")]
    pub program: String,

    /// Optional host program (e.g. `mono`) the executable is passed to
    #[serde(default)]
    pub launcher: Option<String>,

    #[serde(default = "default_code_generator")]
    pub code_generator: String,

    #[serde(default = "default_modeler")]
    pub modeler: String,

    /// License header identifier
    #[serde(default = "default_header")]
    pub header: String,

    #[serde(default = "default_true")]
    pub add_credentials: bool,
}

fn default_generator_program() -> String {
    "autorest".to_string()
}

fn default_code_generator() -> String {
    "Go".to_string()
}

fn default_modeler() -> String {
    "Swagger".to_string()
}

fn default_header() -> String {
    "MICROSOFT_APACHE_NO_VERSION".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            program: default_generator_program(),
            launcher: None,
            code_generator: default_code_generator(),
            modeler: default_modeler(),
            header: default_header(),
            add_credentials: true,
        }
    }
}

/// Program and leading arguments of one external tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ToolSpec {
    pub fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }
}

/// Post-generation tools; the target path is appended to `args`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ToolSettings {
    /// Rewrites sources under the output directory in place
    pub formatter: ToolSpec,
    pub compiler: ToolSpec,
    pub linter: ToolSpec,
    pub vet: ToolSpec,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            formatter: ToolSpec::new("gofmt", &["-w"]),
            compiler: ToolSpec::new("go", &["build"]),
            linter: ToolSpec::new("golint", &[]),
            vet: ToolSpec::new("go", &["vet"]),
        }
    }
}

impl GenConfig {
    /// Parse a catalog file; `source` names it in error messages
    pub fn from_yaml(content: &str, source: &str) -> Result<Self> {
        let config: GenConfig = serde_norway::from_str(content)
            .map_err(|e| Error::config(source, format!("Failed to parse catalog file: {}", e)))?;

        if config.version != CONFIG_VERSION {
            return Err(Error::config(
                source,
                format!("Unsupported catalog version: {}", config.version),
            ));
        }

        Ok(config)
    }

    /// Load a catalog file, or the built-in catalog when `path` is `None`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let content = std::fs::read_to_string(path).map_err(|e| {
                    Error::config(
                        path.display().to_string(),
                        format!("Cannot read file: {}", e),
                    )
                })?;
                Self::from_yaml(&content, &path.display().to_string())
            }
            None => Self::from_yaml(DEFAULT_CATALOG, DEFAULT_CATALOG_LABEL),
        }
    }

    /// Validate every catalog section into a tree
    pub fn catalogs(&self) -> Result<Vec<Catalog>> {
        self.catalogs.iter().map(Catalog::from_config).collect()
    }
}

/// Run-level inputs; everything here may be absent until a stage needs it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSettings {
    /// Product version stamped into generated code
    pub sdk_version: Option<String>,

    /// Local specification checkout; the remote root is used when unset
    pub spec_root: Option<String>,

    /// Directory holding the generator executable
    pub generator_root: Option<PathBuf>,

    /// Workspace (GOPATH) the output tree lives under
    pub workspace_root: PathBuf,
}

impl RunSettings {
    /// Local spec root, ignoring empty values
    pub fn spec_root(&self) -> Option<&str> {
        self.spec_root
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn require_sdk_version(&self) -> Result<&str> {
        self.sdk_version
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::MissingSetting("SDK version (--sdk-version or SDK_VERSION)".into()))
    }

    pub fn require_generator_root(&self) -> Result<&Path> {
        self.generator_root
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| {
                Error::MissingSetting("generator root (--autorest-root or AUTOREST_ROOT)".into())
            })
    }

    /// `<workspace>/src/<module_root>`
    pub fn output_root(&self, settings: &Settings) -> PathBuf {
        let mut root = self.workspace_root.join("src");
        for segment in settings.module_root.split('/').filter(|s| !s.is_empty()) {
            root.push(segment);
        }
        root
    }
}

/// Substitute `{name}` placeholders
pub fn render_template(template: &str, vars: &[(&str, &str)]) -> String {
    vars.iter().fold(template.to_string(), |acc, (name, value)| {
        acc.replace(&format!("{{{}}}", name), value)
    })
}

/// Placeholders the input template must contain
pub const INPUT_PLACEHOLDERS: [&str; 4] = ["root", "fullname", "version", "swagger"];

/// Key path of the namespace template in the catalog file
pub const NAMESPACE_TEMPLATE_KEY: &str = "settings.namespace_template";

/// Key path of the input template in the catalog file
pub const INPUT_TEMPLATE_KEY: &str = "settings.input_template";

/// Placeholders the namespace template must contain
pub const NAMESPACE_PLACEHOLDERS: [&str; 2] = ["plane", "fullname"];

/// Required placeholders missing from `template`
pub fn missing_placeholders<'a>(template: &str, required: &[&'a str]) -> Vec<&'a str> {
    required
        .iter()
        .copied()
        .filter(|name| !template.contains(&format!("{{{}}}", name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_template() {
        let out = render_template(
            "{plane}/{fullname}",
            &[("plane", "arm"), ("fullname", "resources/locks")],
        );
        assert_eq!(out, "arm/resources/locks");
    }

    #[test]
    fn test_missing_placeholders() {
        assert_eq!(
            missing_placeholders("{root}/{fullname}.json", &INPUT_PLACEHOLDERS),
            vec!["version", "swagger"]
        );
        assert!(missing_placeholders(&default_namespace_template(), &NAMESPACE_PLACEHOLDERS).is_empty());
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let config = GenConfig::load(None).unwrap();
        assert_eq!(config.version, 1);
        let names: Vec<_> = config.catalogs.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["arm", "dataplane", "misplaced"]);
        assert_eq!(config.settings, Settings::default());
    }

    #[test]
    fn test_settings_defaults_fill_in() {
        let config = GenConfig::from_yaml(
            r#"
version: 1
settings:
  module_root: example.com/sdk
  tools:
    linter: { program: staticcheck }
catalogs: []
"#,
            "test",
        )
        .unwrap();
        assert_eq!(config.settings.module_root, "example.com/sdk");
        assert_eq!(config.settings.fatal_marker, "[FATAL]");
        assert_eq!(config.settings.tools.linter, ToolSpec::new("staticcheck", &[]));
        assert_eq!(config.settings.tools.compiler, ToolSpec::new("go", &["build"]));
    }

    #[test]
    fn test_unsupported_version() {
        let err = GenConfig::from_yaml("version: 2\ncatalogs: []\n", "test").unwrap_err();
        assert!(err.to_string().contains("Unsupported catalog version: 2"));
    }

    #[test]
    fn test_output_root() {
        let run = RunSettings {
            workspace_root: PathBuf::from("/go"),
            ..Default::default()
        };
        assert_eq!(
            run.output_root(&Settings::default()),
            PathBuf::from("/go/src/github.com/Azure/azure-sdk-for-go")
        );
    }

    #[test]
    fn test_empty_run_values_count_as_missing() {
        let run = RunSettings {
            sdk_version: Some("  ".into()),
            spec_root: Some(String::new()),
            ..Default::default()
        };
        assert!(run.spec_root().is_none());
        assert!(matches!(run.require_sdk_version(), Err(Error::MissingSetting(_))));
        assert!(run.require_generator_root().is_err());
    }
}
