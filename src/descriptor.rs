//! Service descriptors and path derivation
//!
//! A [`ServiceDescriptor`] is one generation unit: one API version of one
//! (sub-)service. Everything on it is derived from the key path that led to
//! the catalog leaf plus a handful of settings; derivation is pure string
//! templating and cannot fail.

use crate::catalog::{LeafSpec, Plane};
use crate::config::{render_template, Settings};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One generation unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    /// Catalog keys from root to leaf, never empty
    pub packages: Vec<String>,
    pub name: String,
    pub fullname: String,
    pub plane: Plane,
    /// Top-level catalog the descriptor was expanded from
    pub catalog: String,
    pub version: String,
    /// Specification base filename
    pub swagger: String,
    pub namespace: String,
    pub task_name: String,
    /// Local path or remote URL of the specification document
    pub input_path: String,
    pub output_path: PathBuf,
    /// Import path handed to the compiler, linter and vet
    pub package_path: String,
}

/// Everything derivation needs besides the leaf itself
#[derive(Debug, Clone, Copy)]
pub struct DeriveContext<'a> {
    pub settings: &'a Settings,
    /// Local specification root; `None` selects the remote root
    pub spec_root: Option<&'a str>,
    pub output_root: &'a Path,
}

/// Per-catalog parameters
#[derive(Debug, Clone, Copy)]
pub struct CatalogScope<'a> {
    pub name: &'a str,
    pub plane: Plane,
    pub path_prefix: &'a str,
}

/// Build the descriptor for the leaf reached through `packages`
pub fn derive_descriptor(
    packages: &[String],
    leaf: &LeafSpec,
    scope: CatalogScope<'_>,
    ctx: &DeriveContext<'_>,
) -> ServiceDescriptor {
    let name = packages.last().cloned().unwrap_or_default();
    let fullname = fullname(packages);
    let swagger = leaf.swagger.clone().unwrap_or_else(|| name.clone());
    let namespace = namespace(&ctx.settings.namespace_template, scope.plane, &fullname);
    let input_path = input_path(
        ctx.settings,
        ctx.spec_root,
        scope.path_prefix,
        &fullname,
        &leaf.version,
        &swagger,
    );

    ServiceDescriptor {
        packages: packages.to_vec(),
        task_name: task_name(scope.plane, packages),
        output_path: output_path(ctx.output_root, &namespace),
        package_path: package_path(&ctx.settings.module_root, &namespace),
        name,
        fullname,
        plane: scope.plane,
        catalog: scope.name.to_string(),
        version: leaf.version.clone(),
        swagger,
        namespace,
        input_path,
    }
}

/// On-disk form of a catalog key
pub fn hyphenate(segment: &str) -> String {
    segment.replace('_', "-")
}

pub fn fullname(packages: &[String]) -> String {
    packages
        .iter()
        .map(|p| hyphenate(p))
        .collect::<Vec<_>>()
        .join("/")
}

/// `plane:pkg:pkg...`
pub fn task_name(plane: Plane, packages: &[String]) -> String {
    let mut name = plane.as_str().to_string();
    for package in packages {
        name.push(':');
        name.push_str(package);
    }
    name
}

pub fn namespace(template: &str, plane: Plane, fullname: &str) -> String {
    render_template(template, &[("plane", plane.as_str()), ("fullname", fullname)])
}

/// Specification location; only `{root}` depends on whether a local root is set
pub fn input_path(
    settings: &Settings,
    spec_root: Option<&str>,
    path_prefix: &str,
    fullname: &str,
    version: &str,
    swagger: &str,
) -> String {
    let root = spec_root
        .filter(|r| !r.trim().is_empty())
        .unwrap_or(settings.remote_spec_root.as_str());
    let root = root.trim_end_matches('/');

    render_template(
        &settings.input_template,
        &[
            ("root", root),
            ("prefix", path_prefix),
            ("fullname", fullname),
            ("version", version),
            ("swagger", swagger),
        ],
    )
}

pub fn output_path(output_root: &Path, namespace: &str) -> PathBuf {
    let mut path = output_root.to_path_buf();
    for segment in namespace.split('/').filter(|s| !s.is_empty()) {
        path.push(segment);
    }
    path
}

pub fn package_path(module_root: &str, namespace: &str) -> String {
    let module_root = module_root.trim_end_matches('/');
    if module_root.is_empty() {
        namespace.to_string()
    } else {
        format!("{}/{}", module_root, namespace)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    fn arm_scope() -> CatalogScope<'static> {
        CatalogScope {
            name: "arm",
            plane: Plane::Arm,
            path_prefix: "arm-",
        }
    }

    #[test]
    fn test_nested_leaf() {
        let settings = Settings::default();
        let ctx = DeriveContext {
            settings: &settings,
            spec_root: None,
            output_root: Path::new("/go/src/github.com/Azure/azure-sdk-for-go"),
        };
        let leaf = LeafSpec {
            version: "2016-09-01".into(),
            swagger: None,
        };

        let desc = derive_descriptor(&keys(&["resources", "locks"]), &leaf, arm_scope(), &ctx);

        assert_eq!(
            desc,
            ServiceDescriptor {
                packages: keys(&["resources", "locks"]),
                name: "locks".into(),
                fullname: "resources/locks".into(),
                plane: Plane::Arm,
                catalog: "arm".into(),
                version: "2016-09-01".into(),
                swagger: "locks".into(),
                namespace: "arm/resources/locks".into(),
                task_name: "arm:resources:locks".into(),
                input_path: "https://raw.githubusercontent.com/Azure/azure-rest-api-specs/master/arm-resources/locks/2016-09-01/swagger/locks.json".into(),
                output_path: PathBuf::from(
                    "/go/src/github.com/Azure/azure-sdk-for-go/arm/resources/locks"
                ),
                package_path: "github.com/Azure/azure-sdk-for-go/arm/resources/locks".into(),
            }
        );
    }

    #[test]
    fn test_underscores_become_hyphens() {
        assert_eq!(
            fullname(&keys(&["datalake_store", "account"])),
            "datalake-store/account"
        );
        assert_eq!(
            task_name(Plane::Arm, &keys(&["datalake_store", "account"])),
            "arm:datalake_store:account"
        );
    }

    #[test]
    fn test_local_spec_root_replaces_only_root() {
        let settings = Settings::default();
        let remote = input_path(&settings, None, "arm-", "compute", "2016-03-30", "compute");
        let local = input_path(
            &settings,
            Some("/specs/"),
            "arm-",
            "compute",
            "2016-03-30",
            "compute",
        );
        assert_eq!(local, "/specs/arm-compute/2016-03-30/swagger/compute.json");
        assert!(remote.ends_with("/arm-compute/2016-03-30/swagger/compute.json"));
        assert_eq!(
            input_path(&settings, Some("   "), "arm-", "compute", "2016-03-30", "compute"),
            remote
        );
    }

    #[test]
    fn test_package_path_without_module_root() {
        assert_eq!(package_path("", "arm/compute"), "arm/compute");
        assert_eq!(package_path("example.com/sdk/", "arm/compute"), "example.com/sdk/arm/compute");
    }
}
