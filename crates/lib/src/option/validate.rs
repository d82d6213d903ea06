use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::option::selection::Selection;
use crate::option::types::{OptionGroup, OptionKey};

/// A buildability rule that a selection broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Violation {
  /// No AES key-size variant is enabled.
  NoVariantSelected,
  /// No mode of operation is enabled.
  NoModeSelected,
}

impl Violation {
  /// The option group this rule guards.
  pub fn group(&self) -> OptionGroup {
    match self {
      Self::NoVariantSelected => OptionGroup::Variant,
      Self::NoModeSelected => OptionGroup::Mode,
    }
  }
}

impl fmt::Display for Violation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let what = match self {
      Self::NoVariantSelected => "no AES key-size variant selected",
      Self::NoModeSelected => "no mode of operation selected",
    };
    let names: Vec<&str> = self.group().members().map(OptionKey::name).collect();
    write!(f, "{}: enable at least one of {}", what, names.join(", "))
  }
}

/// Every rule a selection violated, in group order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[error("{}", join_violations(.violations))]
pub struct ValidationError {
  violations: Vec<Violation>,
}

impl ValidationError {
  pub fn violations(&self) -> &[Violation] {
    &self.violations
  }

  pub fn contains(&self, violation: Violation) -> bool {
    self.violations.contains(&violation)
  }
}

fn join_violations(violations: &[Violation]) -> String {
  violations.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}

/// Check that `selection` enables at least one option in every group.
///
/// All groups are checked, so the error lists every violated rule.
pub fn validate(selection: &Selection) -> Result<(), ValidationError> {
  let violations: Vec<Violation> = OptionGroup::ALL
    .iter()
    .filter(|group| !group.members().any(|key| selection.get(key)))
    .map(OptionGroup::violation)
    .collect();

  if violations.is_empty() {
    Ok(())
  } else {
    debug!(?violations, "selection rejected");
    Err(ValidationError { violations })
  }
}
