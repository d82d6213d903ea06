//! Argument groups shared by several commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use aespkg_lib::build::{BuildSettings, BuildType, CmakeBackend};
use aespkg_lib::option::{Selection, SelectionOverrides};

/// Option overrides merged over the defaults.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
  /// Override an option, e.g. `-D TINYAES_ENABLE_AES256=true` (repeatable)
  #[arg(short = 'D', long = "option", value_name = "NAME=VALUE")]
  pub options: Vec<String>,

  /// JSON file mapping option names to booleans; `-D` values take precedence
  #[arg(long, value_name = "FILE")]
  pub options_file: Option<PathBuf>,
}

impl SelectionArgs {
  pub fn overrides(&self) -> Result<SelectionOverrides> {
    let mut overrides = match &self.options_file {
      Some(path) => SelectionOverrides::from_json_file(path)?,
      None => SelectionOverrides::new(),
    };
    let cli = SelectionOverrides::parse(&self.options).context("Invalid --option value")?;
    overrides.merge(&cli);
    Ok(overrides)
  }

  pub fn selection(&self) -> Result<Selection> {
    let overrides = self.overrides()?;
    if overrides.is_empty() {
      debug!("no option overrides, using defaults");
    }
    Ok(Selection::from_overrides(&overrides))
  }
}

/// Where and how to run the native build.
#[derive(Args, Debug, Clone)]
pub struct BuildArgs {
  /// Directory containing CMakeLists.txt and the library sources
  #[arg(long, default_value = ".")]
  pub source: PathBuf,

  /// Directory for per-plan build trees (default: <source>/.aespkg)
  #[arg(long)]
  pub work: Option<PathBuf>,

  /// CMake build type
  #[arg(long, default_value = "Release")]
  pub build_type: BuildType,

  /// C compiler passed to CMake
  #[arg(long)]
  pub compiler: Option<String>,

  /// Parallel build jobs (default: available CPUs)
  #[arg(short, long)]
  pub jobs: Option<usize>,

  /// cmake executable (default: $AESPKG_CMAKE or `cmake`)
  #[arg(long)]
  pub cmake: Option<PathBuf>,
}

impl BuildArgs {
  pub fn settings(&self) -> BuildSettings {
    let mut settings = BuildSettings::default().with_build_type(self.build_type);
    if let Some(compiler) = &self.compiler {
      settings = settings.with_compiler(compiler.clone());
    }
    if let Some(jobs) = self.jobs {
      settings = settings.with_jobs(jobs);
    }
    settings
  }

  pub fn backend(&self) -> Result<CmakeBackend> {
    let source = dunce::canonicalize(&self.source)
      .with_context(|| format!("Source directory not found: {}", self.source.display()))?;
    let work = match &self.work {
      Some(work) => {
        std::fs::create_dir_all(work)
          .with_context(|| format!("Failed to create work directory: {}", work.display()))?;
        dunce::canonicalize(work).with_context(|| format!("Failed to resolve work directory: {}", work.display()))?
      }
      None => source.join(".aespkg"),
    };
    let mut backend = CmakeBackend::new(source, work);
    if let Some(cmake) = &self.cmake {
      backend = backend.with_program(cmake.clone());
    }
    Ok(backend)
  }
}
