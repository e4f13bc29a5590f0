//! Catalog file CLI commands: check, schema

use super::util::{print_json, Context};
use sdkgen::config::DEFAULT_CATALOG_LABEL;
use sdkgen::*;

pub fn cmd_check(ctx: &Context, json_output: bool) -> Result<()> {
    let result = match &ctx.config_path {
        Some(path) => validate_config_file(path),
        None => validate_config_str(DEFAULT_CATALOG, DEFAULT_CATALOG_LABEL),
    };

    if json_output {
        let output = serde_json::json!({
            "valid": !result.has_errors(),
            "errors": result.error_count(),
            "warnings": result.warning_count(),
            "catalogs": result.catalogs_checked,
            "tasks": result.descriptor_count,
            "issues": result.issues,
        });
        print_json(&output)?;
    } else if result.issues.is_empty() {
        println!(
            "✓ Catalog is valid ({} catalog(s), {} task(s))",
            result.catalogs_checked, result.descriptor_count
        );
    } else {
        for issue in &result.issues {
            let (prefix, level) = match issue.severity {
                Severity::Error => ("✗", "ERROR"),
                Severity::Warning => ("⚠", "WARN"),
            };
            println!("{} [{}] {}: {}", prefix, issue.code, level, issue.message);
            match &issue.path {
                Some(path) => println!("  File: {} (at {})", issue.file, path),
                None => println!("  File: {}", issue.file),
            }
        }

        println!();
        if result.has_errors() {
            println!(
                "✗ {} error(s), {} warning(s)",
                result.error_count(),
                result.warning_count()
            );
        } else {
            println!("✓ {} warning(s) (no errors)", result.warning_count());
        }
    }

    if result.has_errors() {
        return Err("Catalog validation failed".into());
    }
    Ok(())
}

pub fn cmd_schema() -> Result<()> {
    let schema = schemars::schema_for!(GenConfig);
    print_json(&schema)
}
