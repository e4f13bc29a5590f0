//! Catalog listing commands: list, show

use super::util::{print_json, Context};
use sdkgen::*;

pub fn cmd_list(ctx: &Context, long: bool, json_output: bool) -> Result<()> {
    let (_, descriptors) = ctx.load()?;

    if json_output {
        return print_json(&descriptors);
    }

    if !long {
        for desc in &descriptors {
            println!("{}", desc.task_name);
        }
        return Ok(());
    }

    let width = descriptors
        .iter()
        .map(|d| d.task_name.len())
        .max()
        .unwrap_or(0);
    for desc in &descriptors {
        println!(
            "{:<width$}  {:<10}  {:<20}  {}",
            desc.task_name,
            desc.catalog,
            desc.version,
            desc.namespace,
            width = width
        );
    }
    println!();
    println!("{} task(s)", descriptors.len());
    Ok(())
}

pub fn cmd_show(ctx: &Context, task: &str) -> Result<()> {
    let (_, descriptors) = ctx.load()?;
    let desc = find_task(&descriptors, task)?;
    print_json(desc)
}
