use tracing::debug;

use crate::build::types::{BuildError, Definition};
use crate::option::{Selection, validate};

/// Derive the preprocessor definitions for `selection`.
///
/// One definition per enabled option, in option-table order. The selection is
/// validated first; an invalid selection never yields definitions.
pub fn derive_definitions(selection: &Selection) -> Result<Vec<Definition>, BuildError> {
  validate(selection).map_err(BuildError::InvalidSelection)?;

  let definitions: Vec<Definition> = selection.enabled().map(Definition::from).collect();
  debug!(count = definitions.len(), "derived definitions");
  Ok(definitions)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::option::{OptionKey, SelectionOverrides, Violation};

  fn names(defs: &[Definition]) -> Vec<&str> {
    defs.iter().map(Definition::name).collect()
  }

  #[test]
  fn single_variant_and_mode() {
    let selection = Selection::only(&[OptionKey::Aes128, OptionKey::Cbc]);

    let defs = derive_definitions(&selection).unwrap();

    assert_eq!(names(&defs), vec!["TINYAES_ENABLE_AES128", "TINYAES_ENABLE_CBC"]);
  }

  #[test]
  fn default_selection_definitions() {
    let defs = derive_definitions(&Selection::default()).unwrap();

    assert_eq!(
      names(&defs),
      vec![
        "TINYAES_ENABLE_AES128",
        "TINYAES_ENABLE_CBC",
        "TINYAES_ENABLE_ECB",
        "TINYAES_ENABLE_CTR",
      ]
    );
  }

  #[test]
  fn order_ignores_override_order() {
    let a = SelectionOverrides::parse(["TINYAES_ENABLE_AES256=1", "TINYAES_ENABLE_AES192=1"]).unwrap();
    let b = SelectionOverrides::parse(["TINYAES_ENABLE_AES192=1", "TINYAES_ENABLE_AES256=1"]).unwrap();

    let defs_a = derive_definitions(&Selection::from_overrides(&a)).unwrap();
    let defs_b = derive_definitions(&Selection::from_overrides(&b)).unwrap();

    assert_eq!(defs_a, defs_b);
  }

  #[test]
  fn deterministic_across_calls() {
    let selection = Selection::default().with(OptionKey::Aes256, true);

    assert_eq!(
      derive_definitions(&selection).unwrap(),
      derive_definitions(&selection).unwrap()
    );
  }

  #[test]
  fn one_definition_per_enabled_option() {
    let selection = Selection::only(&[
      OptionKey::Aes128,
      OptionKey::Aes192,
      OptionKey::Aes256,
      OptionKey::Cbc,
      OptionKey::Ecb,
      OptionKey::Ctr,
    ]);

    let defs = derive_definitions(&selection).unwrap();

    assert_eq!(defs.len(), selection.enabled_count());
    let mut unique = names(&defs);
    unique.dedup();
    assert_eq!(unique.len(), defs.len());
  }

  #[test]
  fn invalid_selection_is_rejected() {
    let err = derive_definitions(&Selection::only(&[OptionKey::Ecb])).unwrap_err();

    match err {
      BuildError::InvalidSelection(v) => assert_eq!(v.violations(), &[Violation::NoVariantSelected]),
      other => panic!("Expected InvalidSelection, got {:?}", other),
    }
  }
}
