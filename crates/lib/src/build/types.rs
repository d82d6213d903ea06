use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use walkdir::WalkDir;

use crate::consts::MANIFEST_FILE_NAME;
use crate::option::{OptionKey, Selection, ValidationError};
use crate::platform::Platform;
use crate::util::hash::{Hashable, HashError, ObjectHash};

/// A preprocessor definition handed to the native compiler.
///
/// The token is the option name; the value is always `1`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Definition(pub String);

impl Definition {
  pub fn name(&self) -> &str {
    &self.0
  }

  /// Render as a compiler flag, e.g. `-DTINYAES_ENABLE_CBC=1`.
  pub fn to_flag(&self) -> String {
    format!("-D{}=1", self.0)
  }
}

impl From<OptionKey> for Definition {
  fn from(key: OptionKey) -> Self {
    Definition(key.name().to_string())
  }
}

impl fmt::Display for Definition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildType {
  Debug,
  #[default]
  Release,
  RelWithDebInfo,
  MinSizeRel,
}

impl BuildType {
  pub const ALL: [BuildType; 4] = [Self::Debug, Self::Release, Self::RelWithDebInfo, Self::MinSizeRel];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Debug => "Debug",
      Self::Release => "Release",
      Self::RelWithDebInfo => "RelWithDebInfo",
      Self::MinSizeRel => "MinSizeRel",
    }
  }
}

impl fmt::Display for BuildType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for BuildType {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    BuildType::ALL
      .into_iter()
      .find(|t| t.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| {
        let known: Vec<_> = BuildType::ALL.iter().map(BuildType::as_str).collect();
        format!("unknown build type '{}' (expected one of: {})", s, known.join(", "))
      })
  }
}

/// Platform and toolchain settings that are independent of the option
/// selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
  /// Target platform; `None` when the host is not a recognised platform.
  pub platform: Option<Platform>,
  pub build_type: BuildType,
  /// C compiler override; the backend's default is used when unset.
  pub compiler: Option<String>,
  /// Parallel jobs for the native build.
  pub jobs: usize,
}

impl Default for BuildSettings {
  fn default() -> Self {
    Self {
      platform: Platform::current(),
      build_type: BuildType::default(),
      compiler: None,
      jobs: num_cpus(),
    }
  }
}

impl BuildSettings {
  pub fn with_build_type(mut self, build_type: BuildType) -> Self {
    self.build_type = build_type;
    self
  }

  pub fn with_compiler(mut self, compiler: impl Into<String>) -> Self {
    self.compiler = Some(compiler.into());
    self
  }

  pub fn with_jobs(mut self, jobs: usize) -> Self {
    self.jobs = jobs.max(1);
    self
  }
}

fn num_cpus() -> usize {
  std::thread::available_parallelism().map(|p| p.get()).unwrap_or(4)
}

/// Self-description of the external build tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainInfo {
  pub name: String,
  pub version: String,
}

impl fmt::Display for ToolchainInfo {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.name, self.version)
  }
}

/// Everything the external build step needs: the ordered definitions and the
/// settings it should build with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildPlan {
  pub definitions: Vec<Definition>,
  pub selection: Selection,
  pub settings: BuildSettings,
  pub toolchain: ToolchainInfo,
}

/// The parts of a plan that decide what gets compiled. Parallelism is left
/// out so the same plan gets the same id on every host.
#[derive(Serialize)]
struct PlanIdentity<'a> {
  definitions: &'a [Definition],
  selection: &'a Selection,
  platform: &'a Option<Platform>,
  build_type: BuildType,
  compiler: &'a Option<String>,
  toolchain: &'a ToolchainInfo,
}

impl Hashable for PlanIdentity<'_> {}

impl BuildPlan {
  /// Stable identifier of this plan.
  pub fn id(&self) -> Result<ObjectHash, HashError> {
    PlanIdentity {
      definitions: &self.definitions,
      selection: &self.selection,
      platform: &self.settings.platform,
      build_type: self.settings.build_type,
      compiler: &self.settings.compiler,
      toolchain: &self.toolchain,
    }
    .compute_hash()
  }

  /// Definitions rendered as a single compiler flags string.
  pub fn compiler_flags(&self) -> String {
    self.definitions.iter().map(Definition::to_flag).collect::<Vec<_>>().join(" ")
  }
}

/// A file exposed by a build, addressed relative to the root it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputFile {
  pub root: PathBuf,
  pub relative: PathBuf,
}

impl OutputFile {
  pub fn path(&self) -> PathBuf {
    self.root.join(&self.relative)
  }

  pub fn file_name(&self) -> Option<&str> {
    self.relative.file_name().and_then(|n| n.to_str())
  }
}

/// Directory names never treated as build outputs.
const SCAN_EXCLUSIONS: &[&str] = &[".git", "CMakeFiles"];

/// The file set a build exposes to packaging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOutputs {
  files: Vec<OutputFile>,
}

impl BuildOutputs {
  pub fn new() -> Self {
    Self::default()
  }

  /// Collect every file under `root`.
  pub fn from_dir(root: &Path) -> Result<Self, BuildError> {
    let mut outputs = Self::new();
    outputs.add_dir(root, &[])?;
    Ok(outputs)
  }

  /// Add every file under `root`, skipping the subtrees in `skip`.
  ///
  /// Files are visited in file-name order so the resulting set is
  /// deterministic. Directories below `root` holding a package manifest are
  /// earlier package roots and are skipped as well. `skip` entries must be
  /// spelled the way the walk reaches them (same prefix as `root`).
  pub fn add_dir(&mut self, root: &Path, skip: &[&Path]) -> Result<(), BuildError> {
    let walker = WalkDir::new(root).sort_by_file_name().into_iter().filter_entry(|e| {
      let excluded_name = e
        .file_name()
        .to_str()
        .map(|name| SCAN_EXCLUSIONS.contains(&name))
        .unwrap_or(false);
      let package_root = e.depth() > 0 && e.file_type().is_dir() && e.path().join(MANIFEST_FILE_NAME).is_file();
      !excluded_name && !package_root && !skip.iter().any(|s| e.path() == *s)
    });

    for entry in walker {
      let entry = entry.map_err(std::io::Error::from)?;
      if !entry.file_type().is_file() {
        continue;
      }
      let relative = entry.path().strip_prefix(root).unwrap_or(entry.path()).to_path_buf();
      self.files.push(OutputFile {
        root: root.to_path_buf(),
        relative,
      });
    }
    Ok(())
  }

  /// Keep only the files for which `keep` returns true.
  pub fn retain(&mut self, keep: impl FnMut(&OutputFile) -> bool) {
    self.files.retain(keep);
  }

  pub fn files(&self) -> &[OutputFile] {
    &self.files
  }

  pub fn len(&self) -> usize {
    self.files.len()
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }
}

/// Errors raised while configuring or running a build.
#[derive(Debug, Error)]
pub enum BuildError {
  /// Definitions were requested for a selection that does not validate.
  #[error("cannot derive definitions from an invalid selection: {0}")]
  InvalidSelection(ValidationError),

  /// `configure` rejected the selection.
  #[error("validation failed: {0}")]
  ValidationFailed(ValidationError),

  /// The external build tool could not be found or described itself badly.
  #[error("toolchain unavailable ({program}): {reason}")]
  ToolchainUnavailable { program: String, reason: String },

  /// The external build step exited with a failure status.
  #[error("{step} failed with exit code {code:?}: {diagnostics}")]
  CompilationFailed {
    step: String,
    code: Option<i32>,
    diagnostics: String,
  },

  /// The plan could not be hashed.
  #[error("failed to hash build plan: {0}")]
  Hash(#[from] HashError),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::write_file;
  use tempfile::TempDir;

  fn sample_plan() -> BuildPlan {
    BuildPlan {
      definitions: vec![
        Definition::from(OptionKey::Aes128),
        Definition::from(OptionKey::Cbc),
      ],
      selection: Selection::only(&[OptionKey::Aes128, OptionKey::Cbc]),
      settings: BuildSettings::default().with_jobs(2),
      toolchain: ToolchainInfo {
        name: "cmake".to_string(),
        version: "3.28.1".to_string(),
      },
    }
  }

  mod build_plan {
    use super::*;

    #[test]
    fn id_is_deterministic() {
      let plan = sample_plan();
      assert_eq!(plan.id().unwrap(), plan.id().unwrap());
    }

    #[test]
    fn id_changes_with_definitions() {
      let plan1 = sample_plan();
      let mut plan2 = sample_plan();
      plan2.definitions.push(Definition::from(OptionKey::Ctr));

      assert_ne!(plan1.id().unwrap(), plan2.id().unwrap());
    }

    #[test]
    fn id_changes_with_build_type() {
      let plan1 = sample_plan();
      let mut plan2 = sample_plan();
      plan2.settings.build_type = BuildType::Debug;

      assert_ne!(plan1.id().unwrap(), plan2.id().unwrap());
    }

    #[test]
    fn id_ignores_parallelism() {
      let plan1 = sample_plan();
      let mut plan2 = sample_plan();
      plan2.settings.jobs = 64;

      assert_eq!(plan1.id().unwrap(), plan2.id().unwrap());
    }

    #[test]
    fn id_changes_with_compiler() {
      let plan1 = sample_plan();
      let mut plan2 = sample_plan();
      plan2.settings.compiler = Some("clang".to_string());

      assert_ne!(plan1.id().unwrap(), plan2.id().unwrap());
    }

    #[test]
    fn compiler_flags_in_definition_order() {
      assert_eq!(
        sample_plan().compiler_flags(),
        "-DTINYAES_ENABLE_AES128=1 -DTINYAES_ENABLE_CBC=1"
      );
    }
  }

  mod build_type {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
      assert_eq!("release".parse::<BuildType>().unwrap(), BuildType::Release);
      assert_eq!("RELWITHDEBINFO".parse::<BuildType>().unwrap(), BuildType::RelWithDebInfo);
    }

    #[test]
    fn unknown_lists_choices() {
      let err = "fast".parse::<BuildType>().unwrap_err();
      assert!(err.contains("MinSizeRel"));
    }
  }

  mod build_outputs {
    use super::*;

    #[test]
    fn collects_files_in_name_order() {
      let temp = TempDir::new().unwrap();
      write_file(temp.path(), "b.h", "");
      write_file(temp.path(), "a.h", "");
      write_file(temp.path(), "sub/c.a", "");

      let outputs = BuildOutputs::from_dir(temp.path()).unwrap();
      let rel: Vec<_> = outputs.files().iter().map(|f| f.relative.clone()).collect();

      assert_eq!(
        rel,
        vec![PathBuf::from("a.h"), PathBuf::from("b.h"), PathBuf::from("sub").join("c.a")]
      );
    }

    #[test]
    fn skips_vcs_and_cmake_internals() {
      let temp = TempDir::new().unwrap();
      write_file(temp.path(), ".git/HEAD", "");
      write_file(temp.path(), "CMakeFiles/probe.h", "");
      write_file(temp.path(), "aes.h", "");

      let outputs = BuildOutputs::from_dir(temp.path()).unwrap();

      assert_eq!(outputs.len(), 1);
      assert_eq!(outputs.files()[0].file_name(), Some("aes.h"));
    }

    #[test]
    fn skips_requested_subtrees() {
      let temp = TempDir::new().unwrap();
      write_file(temp.path(), "aes.h", "");
      write_file(temp.path(), "work/build-1/libtiny-aes.a", "");

      let work = temp.path().join("work");
      let mut outputs = BuildOutputs::new();
      outputs.add_dir(temp.path(), &[work.as_path()]).unwrap();

      assert_eq!(outputs.len(), 1);
    }

    #[test]
    fn skips_nested_package_roots() {
      let temp = TempDir::new().unwrap();
      write_file(temp.path(), "aes.h", "");
      write_file(temp.path(), "pkg/package-manifest.json", "{}");
      write_file(temp.path(), "pkg/include/aes.h", "");
      write_file(temp.path(), "pkg/lib/libtiny-aes.a", "");

      let outputs = BuildOutputs::from_dir(temp.path()).unwrap();

      assert_eq!(outputs.len(), 1);
      assert_eq!(outputs.files()[0].relative, PathBuf::from("aes.h"));
    }

    #[test]
    fn root_holding_a_manifest_is_still_scanned() {
      let temp = TempDir::new().unwrap();
      write_file(temp.path(), "package-manifest.json", "{}");
      write_file(temp.path(), "include/aes.h", "");

      let outputs = BuildOutputs::from_dir(temp.path()).unwrap();

      assert_eq!(outputs.len(), 2);
    }

    #[test]
    fn retain_filters_files() {
      let temp = TempDir::new().unwrap();
      write_file(temp.path(), "aes.h", "");
      write_file(temp.path(), "libtiny-aes.a", "");

      let mut outputs = BuildOutputs::from_dir(temp.path()).unwrap();
      outputs.retain(|f| f.file_name() != Some("libtiny-aes.a"));

      assert_eq!(outputs.len(), 1);
      assert!(!outputs.is_empty());
    }
  }
}
