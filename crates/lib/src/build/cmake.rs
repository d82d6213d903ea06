//! CMake-driven build backend.
//!
//! Runs `cmake` as a child process: `--version` to describe the toolchain,
//! then a configure step and a build step per plan. Each plan gets its own
//! build directory under the work directory, named by the plan id.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::build::backend::BuildBackend;
use crate::build::types::{BuildError, BuildOutputs, BuildPlan, OutputFile, ToolchainInfo};
use crate::consts::{CMAKE_ENV, SOURCE_DATE_EPOCH};
use crate::package::{ARTIFACT_LAYOUT, ArtifactKind};

#[derive(Debug, Clone)]
pub struct CmakeBackend {
  program: PathBuf,
  source_dir: PathBuf,
  work_dir: PathBuf,
}

impl CmakeBackend {
  /// Backend building `source_dir` into subdirectories of `work_dir`.
  ///
  /// The program defaults to `$AESPKG_CMAKE`, falling back to `cmake` on
  /// `PATH`.
  pub fn new(source_dir: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
    let program = std::env::var_os(CMAKE_ENV)
      .filter(|p| !p.is_empty())
      .map(PathBuf::from)
      .unwrap_or_else(|| PathBuf::from("cmake"));
    Self {
      program,
      source_dir: source_dir.into(),
      work_dir: work_dir.into(),
    }
  }

  pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
    self.program = program.into();
    self
  }

  pub fn program(&self) -> &Path {
    &self.program
  }

  /// Build directory for `plan`.
  pub fn build_dir(&self, plan: &BuildPlan) -> Result<PathBuf, BuildError> {
    Ok(self.work_dir.join(format!("build-{}", plan.id()?)))
  }

  fn configure_args(&self, plan: &BuildPlan, build_dir: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
      "-S".into(),
      self.source_dir.clone().into(),
      "-B".into(),
      build_dir.into(),
      format!("-DCMAKE_BUILD_TYPE={}", plan.settings.build_type).into(),
      format!("-DCMAKE_C_FLAGS={}", plan.compiler_flags()).into(),
    ];
    if let Some(compiler) = &plan.settings.compiler {
      args.push(format!("-DCMAKE_C_COMPILER={}", compiler).into());
    }
    args
  }

  fn build_args(&self, plan: &BuildPlan, build_dir: &Path) -> Vec<OsString> {
    vec![
      "--build".into(),
      build_dir.into(),
      "--config".into(),
      plan.settings.build_type.as_str().into(),
      "--parallel".into(),
      plan.settings.jobs.to_string().into(),
    ]
  }

  async fn run(&self, args: &[OsString]) -> Result<Output, BuildError> {
    let mut command = Command::new(&self.program);
    command
      .args(args)
      .current_dir(&self.source_dir)
      .env("SOURCE_DATE_EPOCH", SOURCE_DATE_EPOCH)
      .env("LC_ALL", "C")
      .kill_on_drop(true);

    debug!(program = %self.program.display(), ?args, "spawning process");
    Ok(command.output().await?)
  }

  async fn run_step(&self, step: &str, args: &[OsString]) -> Result<(), BuildError> {
    info!(step, "running native build step");
    let output = self.run(args).await?;

    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.is_empty() {
      debug!(stdout = %stdout, "{} stdout", step);
    }
    if !stderr.is_empty() {
      debug!(stderr = %stderr, "{} stderr", step);
    }

    if !output.status.success() {
      let diagnostics = if stderr.trim().is_empty() { stdout } else { stderr };
      return Err(BuildError::CompilationFailed {
        step: step.to_string(),
        code: output.status.code(),
        diagnostics: diagnostics.trim().to_string(),
      });
    }
    Ok(())
  }
}

#[async_trait]
impl BuildBackend for CmakeBackend {
  async fn toolchain(&self) -> Result<ToolchainInfo, BuildError> {
    let unavailable = |reason: String| BuildError::ToolchainUnavailable {
      program: self.program.display().to_string(),
      reason,
    };

    let output = self
      .run(&[OsString::from("--version")])
      .await
      .map_err(|e| unavailable(e.to_string()))?;
    if !output.status.success() {
      return Err(unavailable(format!(
        "`--version` exited with code {:?}",
        output.status.code()
      )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let version = parse_version(&stdout)
      .ok_or_else(|| unavailable(format!("unrecognised version output: {}", stdout.trim())))?;

    Ok(ToolchainInfo {
      name: "cmake".to_string(),
      version,
    })
  }

  async fn build(&self, plan: &BuildPlan) -> Result<BuildOutputs, BuildError> {
    let build_dir = self.build_dir(plan)?;
    tokio::fs::create_dir_all(&build_dir).await?;

    self.run_step("configure", &self.configure_args(plan, &build_dir)).await?;
    self.run_step("build", &self.build_args(plan, &build_dir)).await?;

    // The walk reaches the work dir through the source root, so both are
    // compared in canonical form.
    let source_dir = dunce::canonicalize(&self.source_dir)?;
    let work_dir = dunce::canonicalize(&self.work_dir)?;

    let mut outputs = BuildOutputs::new();
    outputs.add_dir(&source_dir, &[work_dir.as_path()])?;
    // Libraries only ever come from this plan's build tree.
    outputs.retain(|file| !is_library(file));
    outputs.add_dir(&build_dir, &[])?;

    info!(files = outputs.len(), build_dir = %build_dir.display(), "native build finished");
    Ok(outputs)
  }
}

fn is_library(file: &OutputFile) -> bool {
  ARTIFACT_LAYOUT
    .iter()
    .filter(|rule| rule.kind == ArtifactKind::Library)
    .any(|rule| rule.matches(file))
}

/// Extract `3.28.1` from `cmake version 3.28.1`.
fn parse_version(output: &str) -> Option<String> {
  let first = output.lines().next()?;
  let version = first.trim().rsplit(' ').next()?;
  version
    .chars()
    .next()
    .filter(char::is_ascii_digit)
    .map(|_| version.to_string())
}
