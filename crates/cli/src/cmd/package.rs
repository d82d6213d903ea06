//! Implementation of the `aespkg package` command.
//!
//! Packages an already-built output tree, without invoking the build backend.

use std::path::Path;

use anyhow::{Context, Result};

use aespkg_lib::build::BuildOutputs;
use aespkg_lib::consts::MANIFEST_FILE_NAME;
use aespkg_lib::package::{PackageManifest, package};

use crate::output::{OutputFormat, print_json, print_stat, print_success, symbols};

pub fn cmd_package(from: &Path, dest: &Path, output: OutputFormat) -> Result<()> {
  let from = dunce::canonicalize(from).with_context(|| format!("Output directory not found: {}", from.display()))?;
  let outputs = BuildOutputs::from_dir(&from).context("Failed to scan build outputs")?;

  let manifest = package(&outputs, dest).context("package failed")?;
  manifest.write_json(&dest.join(MANIFEST_FILE_NAME))?;

  report_manifest(&manifest, output, "Packaged")
}

pub(crate) fn report_manifest(manifest: &PackageManifest, output: OutputFormat, headline: &str) -> Result<()> {
  if output.is_json() {
    return print_json(manifest);
  }

  print_success(headline);
  print_stat("Root", &manifest.root.display().to_string());
  for (artifact, relative) in manifest.artifacts.iter().zip(manifest.relative_destinations()) {
    println!("  {} {} {}", artifact.source.display(), symbols::ARROW, relative.display());
  }
  Ok(())
}
