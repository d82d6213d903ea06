use anyhow::Result;

use aespkg_lib::option::{OPTIONS, OptionGroup};

use crate::output::{OutputFormat, print_flag, print_json};

pub fn cmd_options(output: OutputFormat) -> Result<()> {
  if output.is_json() {
    return print_json(&OPTIONS);
  }

  for group in OptionGroup::ALL {
    println!("{} (at least one required):", group);
    for key in group.members() {
      let decl = key.decl();
      let note = format!("({}; default {})", decl.description, decl.default);
      print_flag(decl.name, decl.default, &note);
    }
  }
  Ok(())
}
