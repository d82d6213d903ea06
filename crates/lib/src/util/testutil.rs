//! Test utilities for aespkg-lib.
//!
//! Helpers for laying out fake source trees and stand-in build programs.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::build::{BuildBackend, BuildError, BuildOutputs, BuildPlan, ToolchainInfo};

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) -> PathBuf {
  let path = root.join(relative);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).unwrap();
  }
  std::fs::write(&path, content).unwrap();
  path
}

/// Lay out a tree that satisfies every artifact rule: headers, a static
/// library nested in a build subdirectory, and the license file.
pub fn complete_output_tree(root: &Path) {
  write_file(root, "aes.h", "/* header */");
  write_file(root, "aes.hpp", "/* c++ header */");
  write_file(root, "build/Release/libtiny-aes.a", "archive");
  write_file(root, "unlicense.txt", "This is free and unencumbered software");
}

/// Write an executable shell script standing in for `cmake`.
///
/// The script answers `--version`. The configure step records its
/// `CMAKE_C_FLAGS` in `<build dir>/flags`, and `--build <dir>` turns that
/// record into `<dir>/libtiny-aes.a`, so a library's content names the plan
/// it was built for. When `fail_build` is set the build step prints to
/// stderr and exits with status 2.
#[cfg(unix)]
pub fn fake_cmake(dir: &Path, fail_build: bool) -> PathBuf {
  use std::os::unix::fs::PermissionsExt;

  let build_step = if fail_build {
    "echo 'aes.c:12: error: expected declaration' >&2; exit 2"
  } else {
    "cp \"$2/flags\" \"$2/libtiny-aes.a\"; exit 0"
  };
  let script = format!(
    "#!/bin/sh\n\
     if [ \"$1\" = \"--version\" ]; then echo 'cmake version 3.28.1'; exit 0; fi\n\
     if [ \"$1\" = \"--build\" ]; then {}; fi\n\
     for a in \"$@\"; do case \"$a\" in -DCMAKE_C_FLAGS=*) echo \"${{a#-DCMAKE_C_FLAGS=}}\" > \"$4/flags\";; esac; done\n\
     exit 0\n",
    build_step
  );

  let path = dir.join("fake-cmake");
  std::fs::write(&path, script).unwrap();
  let mut perms = std::fs::metadata(&path).unwrap().permissions();
  perms.set_mode(0o755);
  std::fs::set_permissions(&path, perms).unwrap();
  path
}

/// In-process `BuildBackend` that serves a fixed output tree.
pub struct StubBackend {
  output_root: PathBuf,
  toolchain_ok: bool,
  failure: Option<(i32, String)>,
  toolchain_calls: AtomicUsize,
  build_calls: AtomicUsize,
}

impl StubBackend {
  pub fn new(output_root: &Path) -> Self {
    Self {
      output_root: output_root.to_path_buf(),
      toolchain_ok: true,
      failure: None,
      toolchain_calls: AtomicUsize::new(0),
      build_calls: AtomicUsize::new(0),
    }
  }

  pub fn without_toolchain(mut self) -> Self {
    self.toolchain_ok = false;
    self
  }

  pub fn failing_with(mut self, code: i32, diagnostics: &str) -> Self {
    self.failure = Some((code, diagnostics.to_string()));
    self
  }

  pub fn toolchain_calls(&self) -> usize {
    self.toolchain_calls.load(Ordering::SeqCst)
  }

  pub fn build_calls(&self) -> usize {
    self.build_calls.load(Ordering::SeqCst)
  }
}

#[async_trait]
impl BuildBackend for StubBackend {
  async fn toolchain(&self) -> Result<ToolchainInfo, BuildError> {
    self.toolchain_calls.fetch_add(1, Ordering::SeqCst);
    if !self.toolchain_ok {
      return Err(BuildError::ToolchainUnavailable {
        program: "stub".to_string(),
        reason: "not installed".to_string(),
      });
    }
    Ok(ToolchainInfo {
      name: "stub".to_string(),
      version: "1.0".to_string(),
    })
  }

  async fn build(&self, _plan: &BuildPlan) -> Result<BuildOutputs, BuildError> {
    self.build_calls.fetch_add(1, Ordering::SeqCst);
    if let Some((code, diagnostics)) = &self.failure {
      return Err(BuildError::CompilationFailed {
        step: "build".to_string(),
        code: Some(*code),
        diagnostics: diagnostics.clone(),
      });
    }
    BuildOutputs::from_dir(&self.output_root)
  }
}
