//! Catalog expansion
//!
//! Flattens catalog trees into descriptors, depth-first in file order. Each
//! recursive call returns its own list; callers concatenate.

use crate::catalog::{is_valid_segment, Catalog, CatalogNode};
use crate::config::{GenConfig, RunSettings, NAMESPACE_TEMPLATE_KEY};
use crate::descriptor::{derive_descriptor, CatalogScope, DeriveContext, ServiceDescriptor};
use crate::error::{Error, Result};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Expand one catalog
pub fn expand_catalog(catalog: &Catalog, ctx: &DeriveContext<'_>) -> Vec<ServiceDescriptor> {
    let scope = CatalogScope {
        name: &catalog.name,
        plane: catalog.plane,
        path_prefix: &catalog.path_prefix,
    };
    expand_children(&[], &catalog.services, scope, ctx)
}

/// Expand `children`, each reached by appending its key to `parents`
pub fn expand_children(
    parents: &[String],
    children: &[(String, CatalogNode)],
    scope: CatalogScope<'_>,
    ctx: &DeriveContext<'_>,
) -> Vec<ServiceDescriptor> {
    children
        .iter()
        .flat_map(|(key, node)| {
            let mut path = parents.to_vec();
            path.push(key.clone());
            expand_node(&path, node, scope, ctx)
        })
        .collect()
}

fn expand_node(
    path: &[String],
    node: &CatalogNode,
    scope: CatalogScope<'_>,
    ctx: &DeriveContext<'_>,
) -> Vec<ServiceDescriptor> {
    match node {
        CatalogNode::Leaf(leaf) => vec![derive_descriptor(path, leaf, scope, ctx)],
        CatalogNode::Group(children) => expand_children(path, children, scope, ctx),
    }
}

/// Expand every catalog in order, then reject unsafe namespaces and duplicate
/// namespaces or task names
pub fn expand_all(catalogs: &[Catalog], ctx: &DeriveContext<'_>) -> Result<Vec<ServiceDescriptor>> {
    let descriptors: Vec<_> = catalogs
        .iter()
        .flat_map(|catalog| {
            let expanded = expand_catalog(catalog, ctx);
            debug!(catalog = %catalog.name, count = expanded.len(), "expanded catalog");
            expanded
        })
        .collect();

    validate_namespaces(&descriptors)?;
    validate_unique(&descriptors)?;
    Ok(descriptors)
}

/// Load-time convenience: validate the file's catalogs and expand them
pub fn expand_config(config: &GenConfig, run: &RunSettings) -> Result<Vec<ServiceDescriptor>> {
    let catalogs = config.catalogs()?;
    let output_root = run.output_root(&config.settings);
    let ctx = DeriveContext {
        settings: &config.settings,
        spec_root: run.spec_root(),
        output_root: &output_root,
    };
    expand_all(&catalogs, &ctx)
}

/// Every namespace segment becomes a directory under the output root, so each
/// one must be a plain path segment (no `..`, no empty or absolute parts)
pub fn validate_namespaces(descriptors: &[ServiceDescriptor]) -> Result<()> {
    for desc in descriptors {
        if let Some(bad) = desc.namespace.split('/').find(|s| !is_valid_segment(s)) {
            return Err(Error::config(
                NAMESPACE_TEMPLATE_KEY,
                format!(
                    "namespace '{}' of {} has invalid segment '{}'",
                    desc.namespace, desc.task_name, bad
                ),
            ));
        }
    }
    Ok(())
}

/// Namespaces and task names must both be unique across all catalogs
pub fn validate_unique(descriptors: &[ServiceDescriptor]) -> Result<()> {
    let mut namespaces: HashMap<&str, &str> = HashMap::new();
    let mut tasks: HashSet<&str> = HashSet::new();

    for desc in descriptors {
        if let Some(first) = namespaces.insert(desc.namespace.as_str(), desc.task_name.as_str()) {
            return Err(Error::DuplicateNamespace {
                namespace: desc.namespace.clone(),
                first: first.to_string(),
                second: desc.task_name.clone(),
            });
        }
        if !tasks.insert(desc.task_name.as_str()) {
            return Err(Error::DuplicateTask(desc.task_name.clone()));
        }
    }
    Ok(())
}

pub fn find_task<'a>(
    descriptors: &'a [ServiceDescriptor],
    task_name: &str,
) -> Result<&'a ServiceDescriptor> {
    descriptors
        .iter()
        .find(|d| d.task_name == task_name)
        .ok_or_else(|| Error::UnknownTask(task_name.to_string()))
}

/// Resolve task names, keeping the order they were given in
pub fn select_tasks<'a, S: AsRef<str>>(
    descriptors: &'a [ServiceDescriptor],
    task_names: &[S],
) -> Result<Vec<&'a ServiceDescriptor>> {
    task_names
        .iter()
        .map(|name| find_task(descriptors, name.as_ref()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Plane;
    use crate::config::Settings;
    use std::path::Path;

    fn ctx(settings: &Settings) -> DeriveContext<'_> {
        DeriveContext {
            settings,
            spec_root: None,
            output_root: Path::new("/out"),
        }
    }

    fn arm() -> Catalog {
        Catalog::new("arm", Plane::Arm, "arm-")
            .with_service("compute", CatalogNode::leaf("2016-03-30"))
            .with_service(
                "resources",
                CatalogNode::group([
                    ("features", CatalogNode::leaf("2015-12-01")),
                    ("locks", CatalogNode::leaf("2016-09-01")),
                ]),
            )
    }

    #[test]
    fn test_preorder_in_key_order() {
        let settings = Settings::default();
        let tasks: Vec<_> = expand_catalog(&arm(), &ctx(&settings))
            .into_iter()
            .map(|d| d.task_name)
            .collect();
        assert_eq!(
            tasks,
            vec!["arm:compute", "arm:resources:features", "arm:resources:locks"]
        );
    }

    #[test]
    fn test_catalogs_concatenate_in_order() {
        let settings = Settings::default();
        let dataplane = Catalog::new("dataplane", Plane::Dataplane, "")
            .with_service("keyvault", CatalogNode::leaf("2015-06-01"));
        let misplaced = Catalog::new("misplaced", Plane::Dataplane, "arm-")
            .with_service("graphrbac", CatalogNode::leaf("1.6"));

        let all = expand_all(&[arm(), dataplane, misplaced], &ctx(&settings)).unwrap();
        assert_eq!(all.len(), 5);
        assert_eq!(all[3].task_name, "dataplane:keyvault");
        assert_eq!(all[3].input_path.split('/').nth(6), Some("keyvault"));

        let graph = &all[4];
        assert_eq!(graph.catalog, "misplaced");
        assert_eq!(graph.namespace, "dataplane/graphrbac");
        assert!(graph.input_path.contains("/arm-graphrbac/1.6/swagger/graphrbac.json"));
    }

    #[test]
    fn test_duplicate_namespace_rejected() {
        let settings = Settings::default();
        let first = Catalog::new("dataplane", Plane::Dataplane, "")
            .with_service("graphrbac", CatalogNode::leaf("1.5"));
        let second = Catalog::new("misplaced", Plane::Dataplane, "arm-")
            .with_service("graphrbac", CatalogNode::leaf("1.6"));

        match expand_all(&[first, second], &ctx(&settings)) {
            Err(Error::DuplicateNamespace {
                namespace,
                first,
                second,
            }) => {
                assert_eq!(namespace, "dataplane/graphrbac");
                assert_eq!(first, "dataplane:graphrbac");
                assert_eq!(second, "dataplane:graphrbac");
            }
            other => panic!("expected duplicate namespace, got {:?}", other),
        }
    }

    #[test]
    fn test_namespace_template_cannot_leave_output_root() {
        let mut settings = Settings::default();
        for template in ["{plane}/../../{fullname}", "/{plane}/{fullname}", "{plane}//{fullname}"] {
            settings.namespace_template = template.to_string();
            match expand_all(&[arm()], &ctx(&settings)) {
                Err(Error::Config { path, message }) => {
                    assert_eq!(path, "settings.namespace_template");
                    assert!(message.contains("arm:compute"), "{}", message);
                }
                other => panic!("{} should be rejected, got {:?}", template, other),
            }
        }
    }

    #[test]
    fn test_hyphen_and_underscore_keys_collide() {
        let settings = Settings::default();
        let catalog = Catalog::new("arm", Plane::Arm, "arm-")
            .with_service("datalake_store", CatalogNode::leaf("2016-11-01"))
            .with_service("datalake-store", CatalogNode::leaf("2016-11-01"));
        let err = expand_all(&[catalog], &ctx(&settings)).unwrap_err();
        assert!(matches!(err, Error::DuplicateNamespace { .. }));
    }

    #[test]
    fn test_select_tasks() {
        let settings = Settings::default();
        let all = expand_catalog(&arm(), &ctx(&settings));

        let picked = select_tasks(&all, &["arm:resources:locks", "arm:compute"]).unwrap();
        assert_eq!(picked[0].name, "locks");
        assert_eq!(picked[1].name, "compute");

        let err = select_tasks(&all, &["arm:nope"]).unwrap_err();
        assert_eq!(err.to_string(), "Unknown task: arm:nope");
    }
}
