//! Static package declaration.
//!
//! The descriptor names the package and lists what it exports; `package_info`
//! is what downstream consumers link against.

use serde::Serialize;

use crate::option::{OPTIONS, OptionDecl};
use crate::package::{ARTIFACT_LAYOUT, ArtifactKind};

/// Library name exposed to consumers.
pub const LIB_NAME: &str = "tiny-aes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Descriptor {
  pub name: &'static str,
  pub version: &'static str,
  pub license: &'static str,
  pub url: &'static str,
  pub description: &'static str,
  pub topics: &'static [&'static str],
  /// Settings that participate in a build's identity.
  pub settings: &'static [&'static str],
  /// Source patterns exported alongside the descriptor.
  pub exports_sources: &'static [&'static str],
  /// The license file shipped at the package root.
  pub license_file: &'static str,
}

static DESCRIPTOR: Descriptor = Descriptor {
  name: "tiny-AES-c",
  version: "1.0.0",
  license: "The Unlicense",
  url: "https://github.com/kokke/tiny-AES-c",
  description: "Small portable AES128/192/256 in C",
  topics: &["encryption", "crypto", "AES"],
  settings: &["os", "compiler", "build_type", "arch"],
  exports_sources: &["CMakeLists.txt", "*.c", "*.h", "*.hpp"],
  license_file: "unlicense.txt",
};

pub fn descriptor() -> &'static Descriptor {
  &DESCRIPTOR
}

impl Descriptor {
  pub fn options(&self) -> &'static [OptionDecl] {
    &OPTIONS
  }
}

/// What a consumer needs to link against the package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageMetadata {
  pub libs: Vec<String>,
  pub include_dirs: Vec<String>,
  pub lib_dirs: Vec<String>,
}

/// Consumable library names and search directories of the package.
pub fn package_info() -> PackageMetadata {
  let dirs_of = |kind: ArtifactKind| -> Vec<String> {
    ARTIFACT_LAYOUT
      .iter()
      .filter(|rule| rule.kind == kind)
      .map(|rule| rule.destination.to_string())
      .collect()
  };

  PackageMetadata {
    libs: vec![LIB_NAME.to_string()],
    include_dirs: dirs_of(ArtifactKind::Header),
    lib_dirs: dirs_of(ArtifactKind::Library),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::package::glob;

  #[test]
  fn package_info_exposes_tiny_aes() {
    let info = package_info();

    assert_eq!(info.libs, vec!["tiny-aes".to_string()]);
    assert_eq!(info.include_dirs, vec!["include".to_string()]);
    assert_eq!(info.lib_dirs, vec!["lib".to_string()]);
  }

  #[test]
  fn package_info_is_stable() {
    assert_eq!(package_info(), package_info());
  }

  #[test]
  fn license_file_is_covered_by_layout() {
    let license_file = descriptor().license_file;
    let covered = ARTIFACT_LAYOUT
      .iter()
      .filter(|rule| rule.kind == ArtifactKind::License)
      .any(|rule| rule.patterns.iter().any(|p| glob::matches(p, license_file)));

    assert!(covered);
  }

  #[test]
  fn descriptor_lists_all_options() {
    assert_eq!(descriptor().options().len(), 6);
    assert_eq!(descriptor().name, "tiny-AES-c");
  }
}
