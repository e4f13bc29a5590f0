//! Smoke test to verify basic functionality

use sdkgen::*;
use std::path::PathBuf;

fn builtin() -> (GenConfig, Vec<ServiceDescriptor>) {
    let config = GenConfig::load(None).unwrap();
    let run = RunSettings {
        workspace_root: PathBuf::from("/go"),
        ..Default::default()
    };
    let descriptors = expand_config(&config, &run).unwrap();
    (config, descriptors)
}

#[test]
fn smoke_test_builtin_catalog_expands() {
    let (config, descriptors) = builtin();

    let names: Vec<_> = config.catalogs.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["arm", "dataplane", "misplaced"]);
    assert_eq!(descriptors.len(), 46);

    let leaves: usize = config
        .catalogs()
        .unwrap()
        .iter()
        .map(Catalog::leaf_count)
        .sum();
    assert_eq!(leaves, descriptors.len());
}

#[test]
fn smoke_test_builtin_catalog_is_valid() {
    let result = validate_config_str(DEFAULT_CATALOG, "built-in");
    assert!(result.issues.is_empty(), "issues: {:?}", result.issues);
    assert_eq!(result.catalogs_checked, 3);
    assert_eq!(result.descriptor_count, 46);
}

#[test]
fn smoke_test_known_tasks() {
    let (_, descriptors) = builtin();

    let locks = find_task(&descriptors, "arm:resources:locks").unwrap();
    assert_eq!(locks.namespace, "arm/resources/locks");
    assert_eq!(
        locks.input_path,
        "https://raw.githubusercontent.com/Azure/azure-rest-api-specs/master/arm-resources/locks/2016-09-01/swagger/locks.json"
    );

    let batch = find_task(&descriptors, "dataplane:batch").unwrap();
    assert_eq!(batch.version, "2016-07-01.3.1");
    assert!(batch
        .input_path
        .ends_with("/batch/2016-07-01.3.1/swagger/BatchService.json"));

    let graph = find_task(&descriptors, "dataplane:graphrbac").unwrap();
    assert_eq!(graph.catalog, "misplaced");
    assert!(graph.input_path.contains("/arm-graphrbac/"));

    assert!(matches!(
        find_task(&descriptors, "arm:nope"),
        Err(Error::UnknownTask(_))
    ));
}

#[test]
fn smoke_test_dry_run_pipeline() {
    struct NeverRun;
    impl ToolRunner for NeverRun {
        fn run(&mut self, command: &ToolCommand) -> Result<ToolOutput> {
            panic!("dry run executed {}", command)
        }
    }

    let config = GenConfig::load(None).unwrap();
    let dir = tempfile::TempDir::new().unwrap();
    let run = RunSettings {
        sdk_version: Some("7.0.0".into()),
        spec_root: None,
        generator_root: Some(PathBuf::from("/opt/autorest")),
        workspace_root: dir.path().to_path_buf(),
    };
    let descriptors = expand_config(&config, &run).unwrap();
    let selected: Vec<_> = descriptors.iter().collect();

    let mut pipeline = Pipeline::new(&config.settings, &run, NeverRun).dry_run(true);
    pipeline.preflight(&Stage::PIPELINE).unwrap();
    let report = pipeline.run_bulk(&selected, &Stage::PIPELINE, FailurePolicy::FailFast);

    assert!(report.is_success());
    assert_eq!(report.tasks.len(), 46);
}
