use async_trait::async_trait;

use crate::build::types::{BuildError, BuildOutputs, BuildPlan, ToolchainInfo};

/// The external capability that turns a `BuildPlan` into native artifacts.
///
/// Implementations own the toolchain. Neither method is retried by the
/// caller; errors are surfaced as-is.
#[async_trait]
pub trait BuildBackend: Send + Sync {
  /// Describe the toolchain, failing with `ToolchainUnavailable` when it
  /// cannot be used.
  async fn toolchain(&self) -> Result<ToolchainInfo, BuildError>;

  /// Run the native configure and build steps for `plan`.
  ///
  /// Blocks the calling task until the native build finishes.
  async fn build(&self, plan: &BuildPlan) -> Result<BuildOutputs, BuildError>;
}
