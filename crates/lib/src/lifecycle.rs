//! Build lifecycle state machine.
//!
//! One lifecycle carries one selection through
//! `Unconfigured → Validated → Configured → Built → Packaged`. Any failure
//! moves it to `Failed`, which is terminal: a corrected selection needs a new
//! lifecycle. Lifecycles share nothing, so independent ones may run
//! concurrently as long as each packages into its own destination root.

use std::fmt;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::build::{self, BuildBackend, BuildError, BuildOutputs, BuildPlan, BuildSettings};
use crate::option::{Selection, ValidationError, validate};
use crate::package::{self, PackageError, PackageManifest};

/// The step a lifecycle was performing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
  Validate,
  Configure,
  Build,
  Package,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Validate => "validate",
      Self::Configure => "configure",
      Self::Build => "build",
      Self::Package => "package",
    };
    write!(f, "{}", s)
  }
}

/// Discriminant of [`LifecycleState`], for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StateKind {
  Unconfigured,
  Validated,
  Configured,
  Built,
  Packaged,
  Failed,
}

impl fmt::Display for StateKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Self::Unconfigured => "unconfigured",
      Self::Validated => "validated",
      Self::Configured => "configured",
      Self::Built => "built",
      Self::Packaged => "packaged",
      Self::Failed => "failed",
    };
    write!(f, "{}", s)
  }
}

#[derive(Debug)]
pub enum LifecycleState {
  Unconfigured,
  Validated,
  Configured(BuildPlan),
  Built { plan: BuildPlan, outputs: BuildOutputs },
  Packaged { plan: BuildPlan, manifest: PackageManifest },
  Failed { stage: Stage, message: String },
}

impl LifecycleState {
  pub fn kind(&self) -> StateKind {
    match self {
      Self::Unconfigured => StateKind::Unconfigured,
      Self::Validated => StateKind::Validated,
      Self::Configured(_) => StateKind::Configured,
      Self::Built { .. } => StateKind::Built,
      Self::Packaged { .. } => StateKind::Packaged,
      Self::Failed { .. } => StateKind::Failed,
    }
  }
}

/// The error of the stage that failed.
#[derive(Debug, Error)]
pub enum StageError {
  #[error(transparent)]
  Validation(#[from] ValidationError),

  #[error(transparent)]
  Build(#[from] BuildError),

  #[error(transparent)]
  Package(#[from] PackageError),
}

#[derive(Debug, Error)]
pub enum LifecycleError {
  /// A stage ran and failed. The lifecycle is now terminal.
  #[error("{stage} failed: {source}")]
  Failed {
    stage: Stage,
    #[source]
    source: StageError,
  },

  /// A stage was requested before its predecessor completed.
  #[error("cannot {attempted} a lifecycle that is {state}")]
  OutOfOrder { attempted: Stage, state: StateKind },

  /// A stage was requested after the lifecycle failed.
  #[error("lifecycle already failed during {stage}; start a new one")]
  Terminated { stage: Stage },
}

impl LifecycleError {
  /// The stage that failed, if a stage ran.
  pub fn stage(&self) -> Option<Stage> {
    match self {
      Self::Failed { stage, .. } => Some(*stage),
      _ => None,
    }
  }
}

/// A single configure → build → package run.
pub struct Lifecycle<'b, B: BuildBackend> {
  selection: Selection,
  settings: BuildSettings,
  backend: &'b B,
  state: LifecycleState,
}

impl<'b, B: BuildBackend> Lifecycle<'b, B> {
  pub fn new(selection: Selection, settings: BuildSettings, backend: &'b B) -> Self {
    Self {
      selection,
      settings,
      backend,
      state: LifecycleState::Unconfigured,
    }
  }

  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  pub fn state(&self) -> &LifecycleState {
    &self.state
  }

  pub fn plan(&self) -> Option<&BuildPlan> {
    match &self.state {
      LifecycleState::Configured(plan)
      | LifecycleState::Built { plan, .. }
      | LifecycleState::Packaged { plan, .. } => Some(plan),
      _ => None,
    }
  }

  pub fn outputs(&self) -> Option<&BuildOutputs> {
    match &self.state {
      LifecycleState::Built { outputs, .. } => Some(outputs),
      _ => None,
    }
  }

  pub fn manifest(&self) -> Option<&PackageManifest> {
    match &self.state {
      LifecycleState::Packaged { manifest, .. } => Some(manifest),
      _ => None,
    }
  }

  fn misordered(&self, attempted: Stage) -> LifecycleError {
    match &self.state {
      LifecycleState::Failed { stage, .. } => LifecycleError::Terminated { stage: *stage },
      state => LifecycleError::OutOfOrder {
        attempted,
        state: state.kind(),
      },
    }
  }

  fn fail(&mut self, stage: Stage, source: impl Into<StageError>) -> LifecycleError {
    let source = source.into();
    error!(%stage, error = %source, "lifecycle failed");
    self.state = LifecycleState::Failed {
      stage,
      message: source.to_string(),
    };
    LifecycleError::Failed { stage, source }
  }

  pub fn validate(&mut self) -> Result<(), LifecycleError> {
    if self.state.kind() != StateKind::Unconfigured {
      return Err(self.misordered(Stage::Validate));
    }
    match validate(&self.selection) {
      Ok(()) => {
        info!(enabled = self.selection.enabled_count(), "selection validated");
        self.state = LifecycleState::Validated;
        Ok(())
      }
      Err(e) => Err(self.fail(Stage::Validate, e)),
    }
  }

  pub async fn configure(&mut self) -> Result<(), LifecycleError> {
    if self.state.kind() != StateKind::Validated {
      return Err(self.misordered(Stage::Configure));
    }
    match build::configure(&self.selection, &self.settings, self.backend).await {
      Ok(plan) => {
        self.state = LifecycleState::Configured(plan);
        Ok(())
      }
      Err(e) => Err(self.fail(Stage::Configure, e)),
    }
  }

  pub async fn build(&mut self) -> Result<(), LifecycleError> {
    let plan = match &self.state {
      LifecycleState::Configured(plan) => plan.clone(),
      _ => return Err(self.misordered(Stage::Build)),
    };
    match build::build(&plan, self.backend).await {
      Ok(outputs) => {
        self.state = LifecycleState::Built { plan, outputs };
        Ok(())
      }
      Err(e) => Err(self.fail(Stage::Build, e)),
    }
  }

  pub fn package(&mut self, destination_root: &Path) -> Result<(), LifecycleError> {
    let result = match &self.state {
      LifecycleState::Built { outputs, .. } => package::package(outputs, destination_root),
      _ => return Err(self.misordered(Stage::Package)),
    };
    match result {
      Ok(manifest) => {
        let state = std::mem::replace(&mut self.state, LifecycleState::Unconfigured);
        if let LifecycleState::Built { plan, .. } = state {
          self.state = LifecycleState::Packaged { plan, manifest };
        }
        Ok(())
      }
      Err(e) => Err(self.fail(Stage::Package, e)),
    }
  }

  /// Drive every stage in order and return the package manifest.
  pub async fn run(mut self, destination_root: &Path) -> Result<PackageManifest, LifecycleError> {
    self.validate()?;
    self.configure().await?;
    self.build().await?;
    self.package(destination_root)?;

    match self.state {
      LifecycleState::Packaged { manifest, .. } => Ok(manifest),
      state => Err(LifecycleError::OutOfOrder {
        attempted: Stage::Package,
        state: state.kind(),
      }),
    }
  }
}
