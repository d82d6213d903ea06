//! Implementation of the `aespkg plan` command.
//!
//! Runs validation and the configure stage, then prints the resulting build
//! plan without compiling anything.

use anyhow::{Context, Result};

use aespkg_lib::build::configure;

use crate::cmd::{BuildArgs, SelectionArgs};
use crate::output::{OutputFormat, print_info, print_json, print_stat, truncate_hash};

pub fn cmd_plan(selection: &SelectionArgs, build: &BuildArgs, output: OutputFormat) -> Result<()> {
  let selection = selection.selection()?;
  let settings = build.settings();
  let backend = build.backend()?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let plan = rt
    .block_on(configure(&selection, &settings, &backend))
    .context("configure failed")?;
  let id = plan.id().context("Failed to compute plan id")?;
  let build_dir = backend.build_dir(&plan)?;

  if output.is_json() {
    return print_json(&serde_json::json!({
      "id": id,
      "build_dir": build_dir,
      "plan": plan,
    }));
  }

  print_info(&format!("Plan: {}", truncate_hash(&id.0)));
  print_stat("Toolchain", &plan.toolchain.to_string());
  print_stat("Build type", plan.settings.build_type.as_str());
  if let Some(platform) = &plan.settings.platform {
    print_stat("Platform", &platform.triple());
  }
  print_stat("Build dir", &build_dir.display().to_string());
  println!("Definitions:");
  for definition in &plan.definitions {
    println!("  {}", definition.to_flag());
  }
  Ok(())
}
