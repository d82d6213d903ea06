//! Implementation of the `aespkg validate` command.

use anyhow::{Result, bail};

use aespkg_lib::option::validate;

use crate::cmd::SelectionArgs;
use crate::output::{OutputFormat, print_error, print_flag, print_json, print_success};

pub fn cmd_validate(args: &SelectionArgs, output: OutputFormat) -> Result<()> {
  let selection = args.selection()?;
  let result = validate(&selection);

  if output.is_json() {
    let violations = result.as_ref().err().map(|e| e.violations().to_vec()).unwrap_or_default();
    print_json(&serde_json::json!({
      "valid": result.is_ok(),
      "selection": selection,
      "violations": violations,
    }))?;
  } else {
    for (key, enabled) in selection.iter() {
      print_flag(key.name(), enabled, "");
    }
    match &result {
      Ok(()) => print_success("Selection is buildable"),
      Err(e) => {
        for violation in e.violations() {
          print_error(&violation.to_string());
        }
      }
    }
  }

  if let Err(e) = result {
    bail!("validate failed: {} rule(s) violated", e.violations().len());
  }
  Ok(())
}
