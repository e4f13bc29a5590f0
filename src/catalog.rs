//! Service catalog tree
//!
//! A catalog is an ordered tree of service families. Raw YAML is parsed once
//! into [`CatalogNode`] values so traversal never has to probe keys: a
//! mapping holding a `version` key becomes a [`LeafSpec`], every other
//! mapping becomes a group of named children.

use crate::config::CatalogConfig;
use crate::error::{Error, Result};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_norway::{Mapping, Value};
use std::fmt;
use std::sync::LazyLock;

/// Keys and versions end up as path segments, so they are restricted to a
/// conservative character set.
static SEGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("valid segment regex"));

const VERSION_KEY: &str = "version";
const SWAGGER_KEY: &str = "swagger";

/// Which generation mode a catalog feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Plane {
    /// Management plane (Azure Resource Manager)
    Arm,
    Dataplane,
}

impl Plane {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plane::Arm => "arm",
            Plane::Dataplane => "dataplane",
        }
    }
}

impl fmt::Display for Plane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete API version of one service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSpec {
    pub version: String,
    /// Specification base filename, when it differs from the service key
    pub swagger: Option<String>,
}

/// A node of the catalog tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogNode {
    Leaf(LeafSpec),
    /// Children in file order
    Group(Vec<(String, CatalogNode)>),
}

impl CatalogNode {
    pub fn leaf(version: &str) -> Self {
        CatalogNode::Leaf(LeafSpec {
            version: version.to_string(),
            swagger: None,
        })
    }

    pub fn leaf_with_swagger(version: &str, swagger: &str) -> Self {
        CatalogNode::Leaf(LeafSpec {
            version: version.to_string(),
            swagger: Some(swagger.to_string()),
        })
    }

    pub fn group<I, K>(children: I) -> Self
    where
        I: IntoIterator<Item = (K, CatalogNode)>,
        K: Into<String>,
    {
        CatalogNode::Group(children.into_iter().map(|(k, n)| (k.into(), n)).collect())
    }

    /// Number of leaves at or below this node
    pub fn leaf_count(&self) -> usize {
        match self {
            CatalogNode::Leaf(_) => 1,
            CatalogNode::Group(children) => children.iter().map(|(_, n)| n.leaf_count()).sum(),
        }
    }
}

/// One top-level catalog, validated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub name: String,
    pub plane: Plane,
    /// Prepended to the full service name in specification paths (e.g. `arm-`)
    pub path_prefix: String,
    pub services: Vec<(String, CatalogNode)>,
}

impl Catalog {
    pub fn new(name: &str, plane: Plane, path_prefix: &str) -> Self {
        Self {
            name: name.to_string(),
            plane,
            path_prefix: path_prefix.to_string(),
            services: Vec::new(),
        }
    }

    pub fn with_service(mut self, key: &str, node: CatalogNode) -> Self {
        self.services.push((key.to_string(), node));
        self
    }

    /// Validate a raw catalog section into a tree
    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        if config.name.trim().is_empty() {
            return Err(Error::config("catalogs", "catalog name must not be empty"));
        }
        let mut path = vec![config.name.clone()];
        let services = parse_children(&mut path, &config.services)?;

        Ok(Self {
            name: config.name.clone(),
            plane: config.plane,
            path_prefix: config.path_prefix.clone(),
            services,
        })
    }

    pub fn leaf_count(&self) -> usize {
        self.services.iter().map(|(_, n)| n.leaf_count()).sum()
    }
}

/// Check a key or version against the path segment rules
pub fn is_valid_segment(segment: &str) -> bool {
    SEGMENT_RE.is_match(segment)
}

fn display_path(path: &[String]) -> String {
    path.join(".")
}

fn parse_children(path: &mut Vec<String>, mapping: &Mapping) -> Result<Vec<(String, CatalogNode)>> {
    if mapping.is_empty() {
        return Err(Error::config(
            display_path(path),
            "group has no children",
        ));
    }

    let mut children = Vec::with_capacity(mapping.len());
    for (key, value) in mapping {
        let key = match key {
            Value::String(s) => s.clone(),
            other => {
                return Err(Error::config(
                    display_path(path),
                    format!("keys must be strings, found {}", describe(other)),
                ))
            }
        };
        if !is_valid_segment(&key) {
            return Err(Error::config(
                display_path(path),
                format!("'{}' is not a valid service key", key),
            ));
        }

        path.push(key.clone());
        let node = parse_node(path, value)?;
        path.pop();
        children.push((key, node));
    }
    Ok(children)
}

fn parse_node(path: &mut Vec<String>, value: &Value) -> Result<CatalogNode> {
    let mapping = match value {
        Value::Mapping(m) => m,
        other => {
            return Err(Error::config(
                display_path(path),
                format!("expected a mapping, found {}", describe(other)),
            ))
        }
    };

    if mapping.contains_key(VERSION_KEY) {
        parse_leaf(path, mapping).map(CatalogNode::Leaf)
    } else {
        parse_children(path, mapping).map(CatalogNode::Group)
    }
}

fn parse_leaf(path: &[String], mapping: &Mapping) -> Result<LeafSpec> {
    let mut version = None;
    let mut swagger = None;

    for (key, value) in mapping {
        match key.as_str() {
            Some(VERSION_KEY) => version = Some(segment_field(path, VERSION_KEY, value)?),
            Some(SWAGGER_KEY) => swagger = Some(segment_field(path, SWAGGER_KEY, value)?),
            Some(other) => {
                return Err(Error::config(
                    display_path(path),
                    format!(
                        "unexpected field '{}' in a version entry (allowed: version, swagger)",
                        other
                    ),
                ))
            }
            None => {
                return Err(Error::config(
                    display_path(path),
                    format!("keys must be strings, found {}", describe(key)),
                ))
            }
        }
    }

    let version = version.ok_or_else(|| Error::config(display_path(path), "missing version"))?;
    Ok(LeafSpec { version, swagger })
}

fn segment_field(path: &[String], field: &str, value: &Value) -> Result<String> {
    let text = match value {
        Value::String(s) => s.as_str(),
        Value::Number(n) => {
            return Err(Error::config(
                display_path(path),
                format!("{} must be a quoted string, found number {}", field, n),
            ))
        }
        other => {
            return Err(Error::config(
                display_path(path),
                format!("{} must be a string, found {}", field, describe(other)),
            ))
        }
    };

    if text.is_empty() {
        return Err(Error::config(
            display_path(path),
            format!("{} must not be empty", field),
        ));
    }
    if !is_valid_segment(text) {
        return Err(Error::config(
            display_path(path),
            format!("{} '{}' contains characters not allowed in a path", field, text),
        ));
    }
    Ok(text.to_string())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
