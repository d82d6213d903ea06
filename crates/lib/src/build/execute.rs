//! Configure and build stages.
//!
//! `configure` turns a selection into a `BuildPlan`; `build` hands the plan to
//! a `BuildBackend`. Neither stage retries: the first error is returned.

use tracing::{info, warn};

use crate::build::backend::BuildBackend;
use crate::build::definitions::derive_definitions;
use crate::build::types::{BuildError, BuildOutputs, BuildPlan, BuildSettings};
use crate::option::{Selection, validate};

/// Validate `selection`, derive its definitions and pair them with the
/// toolchain described by `backend`.
pub async fn configure(
  selection: &Selection,
  settings: &BuildSettings,
  backend: &impl BuildBackend,
) -> Result<BuildPlan, BuildError> {
  validate(selection).map_err(BuildError::ValidationFailed)?;
  let definitions = derive_definitions(selection)?;

  let toolchain = backend.toolchain().await.inspect_err(|e| {
    warn!(error = %e, "toolchain unavailable");
  })?;

  let plan = BuildPlan {
    definitions,
    selection: *selection,
    settings: settings.clone(),
    toolchain,
  };
  info!(
    plan = %plan.id()?,
    toolchain = %plan.toolchain,
    definitions = plan.definitions.len(),
    "configured build"
  );
  Ok(plan)
}

/// Run the native build described by `plan`.
pub async fn build(plan: &BuildPlan, backend: &impl BuildBackend) -> Result<BuildOutputs, BuildError> {
  let outputs = backend.build(plan).await?;
  if outputs.is_empty() {
    warn!("build produced no output files");
  } else {
    info!(files = outputs.len(), "build produced outputs");
  }
  Ok(outputs)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::option::{OptionKey, Violation};
  use crate::util::testutil::StubBackend;
  use tempfile::TempDir;

  #[tokio::test]
  async fn configure_builds_plan_from_selection() {
    let temp = TempDir::new().unwrap();
    let backend = StubBackend::new(temp.path());
    let selection = Selection::only(&[OptionKey::Aes192, OptionKey::Ecb]);

    let plan = configure(&selection, &BuildSettings::default(), &backend).await.unwrap();

    let names: Vec<_> = plan.definitions.iter().map(|d| d.name()).collect();
    assert_eq!(names, vec!["TINYAES_ENABLE_AES192", "TINYAES_ENABLE_ECB"]);
    assert_eq!(plan.selection, selection);
    assert_eq!(plan.toolchain.name, "stub");
  }

  #[tokio::test]
  async fn configure_rejects_invalid_selection_before_probing() {
    let temp = TempDir::new().unwrap();
    let backend = StubBackend::new(temp.path()).without_toolchain();

    let err = configure(&Selection::only(&[]), &BuildSettings::default(), &backend)
      .await
      .unwrap_err();

    match err {
      BuildError::ValidationFailed(v) => {
        assert!(v.contains(Violation::NoVariantSelected));
        assert!(v.contains(Violation::NoModeSelected));
      }
      other => panic!("Expected ValidationFailed, got {:?}", other),
    }
  }

  #[tokio::test]
  async fn configure_propagates_toolchain_unavailable() {
    let temp = TempDir::new().unwrap();
    let backend = StubBackend::new(temp.path()).without_toolchain();

    let err = configure(&Selection::default(), &BuildSettings::default(), &backend)
      .await
      .unwrap_err();

    assert!(matches!(err, BuildError::ToolchainUnavailable { .. }));
    assert_eq!(backend.toolchain_calls(), 1);
  }

  #[tokio::test]
  async fn build_surfaces_compilation_failure_without_retry() {
    let temp = TempDir::new().unwrap();
    let backend = StubBackend::new(temp.path()).failing_with(1, "aes.c: error");
    let plan = configure(&Selection::default(), &BuildSettings::default(), &backend)
      .await
      .unwrap();

    let err = build(&plan, &backend).await.unwrap_err();

    assert!(matches!(err, BuildError::CompilationFailed { code: Some(1), .. }));
    assert_eq!(backend.build_calls(), 1);
  }

  #[tokio::test]
  #[tracing_test::traced_test]
  async fn build_warns_on_empty_outputs() {
    let temp = TempDir::new().unwrap();
    let backend = StubBackend::new(temp.path());
    let plan = configure(&Selection::default(), &BuildSettings::default(), &backend)
      .await
      .unwrap();

    let outputs = build(&plan, &backend).await.unwrap();

    assert!(outputs.is_empty());
    assert!(logs_contain("build produced no output files"));
  }
}
