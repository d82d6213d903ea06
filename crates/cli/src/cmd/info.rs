use anyhow::Result;

use aespkg_lib::descriptor::{LIB_NAME, descriptor, package_info};
use aespkg_lib::platform::Platform;

use crate::output::{OutputFormat, print_json, print_stat};

pub fn cmd_info(output: OutputFormat) -> Result<()> {
  let descriptor = descriptor();
  let metadata = package_info();
  let platform = Platform::current();

  if output.is_json() {
    return print_json(&serde_json::json!({
      "descriptor": descriptor,
      "package_info": metadata,
      "platform": platform,
    }));
  }

  println!("{} {}", descriptor.name, descriptor.version);
  println!("{}", descriptor.description);
  print_stat("License", descriptor.license);
  print_stat("Url", descriptor.url);
  print_stat("Topics", &descriptor.topics.join(", "));
  print_stat("Libs", &metadata.libs.join(", "));
  print_stat("Include dirs", &metadata.include_dirs.join(", "));
  print_stat("Lib dirs", &metadata.lib_dirs.join(", "));
  match platform {
    Some(platform) => {
      print_stat("Platform", &platform.triple());
      print_stat("Library file", &platform.static_library_name(LIB_NAME));
    }
    None => println!("Could not detect platform."),
  }
  Ok(())
}
