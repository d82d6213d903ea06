//! Implementation of the `aespkg create` command.
//!
//! Runs the full lifecycle (validate, configure, build, package) and writes
//! the package manifest into the destination root.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::info;

use aespkg_lib::consts::MANIFEST_FILE_NAME;
use aespkg_lib::lifecycle::Lifecycle;

use crate::cmd::{BuildArgs, SelectionArgs};
use crate::cmd::package::report_manifest;
use crate::output::OutputFormat;

pub fn cmd_create(selection: &SelectionArgs, build: &BuildArgs, dest: &Path, output: OutputFormat) -> Result<()> {
  let selection = selection.selection()?;
  let backend = build.backend()?;
  let started = Instant::now();

  std::fs::create_dir_all(dest).with_context(|| format!("Failed to create destination: {}", dest.display()))?;
  let dest = dunce::canonicalize(dest).with_context(|| format!("Failed to resolve destination: {}", dest.display()))?;

  let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
  let manifest = rt.block_on(Lifecycle::new(selection, build.settings(), &backend).run(&dest))?;

  let manifest_path = dest.join(MANIFEST_FILE_NAME);
  manifest.write_json(&manifest_path)?;

  let elapsed = humantime::format_duration(std::time::Duration::from_secs(started.elapsed().as_secs()));
  info!(elapsed = %elapsed, "create finished");
  report_manifest(&manifest, output, &format!("Package created in {}", elapsed))
}
