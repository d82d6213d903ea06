//! Packaging of build outputs.
//!
//! `package` resolves each rule of the artifact layout against a build's
//! output files and copies the matches into a destination root:
//!
//! ```text
//! <root>/include/...      headers, relative paths preserved
//! <root>/lib/<file>       static library, flattened
//! <root>/unlicense.txt    license
//! ```
//!
//! Every rule is checked before anything is copied, so a package that fails
//! on a missing artifact leaves no partial tree behind.

pub mod glob;
mod layout;

pub use layout::*;

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::build::{BuildOutputs, OutputFile};

#[derive(Debug, Error)]
pub enum PackageError {
  /// A mandatory rule matched no output file.
  #[error("no artifacts matched for {rule} ({})", .patterns.join(", "))]
  NoArtifactsMatched {
    rule: String,
    patterns: Vec<String>,
  },

  #[error("failed to copy {source_path} to {destination}: {error}")]
  Copy {
    source_path: PathBuf,
    destination: PathBuf,
    #[source]
    error: std::io::Error,
  },

  #[error("failed to write package manifest {path}: {message}")]
  Manifest { path: PathBuf, message: String },

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

/// A single file placed into the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopiedArtifact {
  pub source: PathBuf,
  pub destination: PathBuf,
  pub rule: String,
  pub kind: ArtifactKind,
}

/// What `package` actually copied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageManifest {
  pub root: PathBuf,
  pub artifacts: Vec<CopiedArtifact>,
  /// Destination of the license file.
  pub license: Option<PathBuf>,
}

impl PackageManifest {
  /// Artifacts placed by the rule named `rule`.
  pub fn by_rule<'a>(&'a self, rule: &'a str) -> impl Iterator<Item = &'a CopiedArtifact> + 'a {
    self.artifacts.iter().filter(move |a| a.rule == rule)
  }

  /// Destinations relative to the package root, in copy order.
  pub fn relative_destinations(&self) -> Vec<PathBuf> {
    self
      .artifacts
      .iter()
      .map(|a| a.destination.strip_prefix(&self.root).unwrap_or(&a.destination).to_path_buf())
      .collect()
  }

  /// Serialize the manifest as pretty JSON to `path`.
  pub fn write_json(&self, path: &Path) -> Result<(), PackageError> {
    let manifest_err = |message: String| PackageError::Manifest {
      path: path.to_path_buf(),
      message,
    };
    let json = serde_json::to_string_pretty(self).map_err(|e| manifest_err(e.to_string()))?;
    fs::write(path, json).map_err(|e| manifest_err(e.to_string()))
  }
}

/// Package `outputs` into `destination_root` using [`ARTIFACT_LAYOUT`].
pub fn package(outputs: &BuildOutputs, destination_root: &Path) -> Result<PackageManifest, PackageError> {
  package_with_layout(outputs, destination_root, ARTIFACT_LAYOUT)
}

/// Package `outputs` into `destination_root` using `layout`.
pub fn package_with_layout(
  outputs: &BuildOutputs,
  destination_root: &Path,
  layout: &[ArtifactRule],
) -> Result<PackageManifest, PackageError> {
  // Resolve every rule first; a missing artifact aborts before any copy.
  let mut resolved: Vec<(&ArtifactRule, Vec<&OutputFile>)> = Vec::with_capacity(layout.len());
  for rule in layout {
    let matched: Vec<&OutputFile> = outputs.files().iter().filter(|f| rule.matches(f)).collect();
    if matched.is_empty() {
      return Err(PackageError::NoArtifactsMatched {
        rule: rule.name.to_string(),
        patterns: rule.patterns.iter().map(|p| p.to_string()).collect(),
      });
    }
    debug!(rule = rule.name, matched = matched.len(), "resolved artifact rule");
    resolved.push((rule, matched));
  }

  let mut manifest = PackageManifest {
    root: destination_root.to_path_buf(),
    artifacts: Vec::new(),
    license: None,
  };
  let mut placed: HashSet<PathBuf> = HashSet::new();

  for (rule, files) in resolved {
    for file in files {
      let destination = rule.destination_for(destination_root, file);
      if !placed.insert(destination.clone()) {
        warn!(
          source = %file.path().display(),
          destination = %destination.display(),
          "skipping artifact, destination already packaged"
        );
        continue;
      }

      copy_artifact(&file.path(), &destination)?;

      if rule.kind == ArtifactKind::License && manifest.license.is_none() {
        manifest.license = Some(destination.clone());
      }
      manifest.artifacts.push(CopiedArtifact {
        source: file.path(),
        destination,
        rule: rule.name.to_string(),
        kind: rule.kind,
      });
    }
  }

  info!(
    root = %destination_root.display(),
    artifacts = manifest.artifacts.len(),
    "packaged artifacts"
  );
  Ok(manifest)
}

fn copy_artifact(source: &Path, destination: &Path) -> Result<(), PackageError> {
  if let Some(parent) = destination.parent() {
    fs::create_dir_all(parent)?;
  }
  fs::copy(source, destination).map_err(|error| PackageError::Copy {
    source_path: source.to_path_buf(),
    destination: destination.to_path_buf(),
    error,
  })?;
  debug!(source = %source.display(), destination = %destination.display(), "copied artifact");
  Ok(())
}
