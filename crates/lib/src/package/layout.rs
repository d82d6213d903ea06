use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::build::OutputFile;
use crate::package::glob;

/// What an artifact is, as far as consumers care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
  Header,
  Library,
  License,
}

/// One entry of the artifact layout: which files go where.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRule {
  /// Short name used in errors, e.g. `lib`.
  pub name: &'static str,
  /// File-name patterns; a file matching any of them belongs to this rule.
  pub patterns: &'static [&'static str],
  /// Destination directory relative to the package root (`""` for the root).
  pub destination: &'static str,
  /// Keep the file's path relative to its output root. When false the file
  /// lands directly in `destination`.
  pub keep_path: bool,
  pub kind: ArtifactKind,
}

impl ArtifactRule {
  pub fn matches(&self, file: &OutputFile) -> bool {
    file
      .file_name()
      .map(|name| self.patterns.iter().any(|p| glob::matches(p, name)))
      .unwrap_or(false)
  }

  /// Where `file` is placed under `root`.
  pub fn destination_for(&self, root: &Path, file: &OutputFile) -> PathBuf {
    let dir = root.join(self.destination);
    if self.keep_path {
      dir.join(&file.relative)
    } else {
      // file_name is always present for matched files
      dir.join(file.relative.file_name().unwrap_or(file.relative.as_os_str()))
    }
  }
}

/// The fixed artifact layout of the package.
///
/// Every rule is mandatory: packaging fails if any rule matches nothing.
pub static ARTIFACT_LAYOUT: &[ArtifactRule] = &[
  ArtifactRule {
    name: "headers",
    patterns: &["*.h", "*.hpp"],
    destination: "include",
    keep_path: true,
    kind: ArtifactKind::Header,
  },
  ArtifactRule {
    name: "lib",
    patterns: &["*.a", "*.lib"],
    destination: "lib",
    keep_path: false,
    kind: ArtifactKind::Library,
  },
  ArtifactRule {
    name: "license",
    patterns: &["unlicense.txt"],
    destination: "",
    keep_path: false,
    kind: ArtifactKind::License,
  },
];
