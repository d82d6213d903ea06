//! Host platform detection.
//!
//! The detected platform seeds the `os` and `arch` build settings and decides
//! how the native static library is named.

pub mod arch;
pub mod os;

use std::fmt;

use serde::{Deserialize, Serialize};

use arch::Arch;
use os::Os;

/// Platform identifier combining architecture and OS (e.g., "x86_64-linux")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Platform {
  pub arch: Arch,
  pub os: Os,
}

impl Platform {
  pub fn new(arch: Arch, os: Os) -> Self {
    Self { arch, os }
  }

  /// Detect the current platform at runtime
  ///
  /// Returns `None` if the OS or architecture is not supported
  pub fn current() -> Option<Self> {
    Some(Self {
      arch: Arch::current()?,
      os: Os::current()?,
    })
  }

  /// Returns the platform triple string (e.g., "aarch64-darwin")
  pub fn triple(&self) -> String {
    format!("{}-{}", self.arch, self.os)
  }

  /// File name of the static library `lib` on this platform.
  pub fn static_library_name(&self, lib: &str) -> String {
    match self.os {
      Os::Windows => format!("{}.lib", lib),
      Os::Linux | Os::MacOs => format!("lib{}.a", lib),
    }
  }
}

impl fmt::Display for Platform {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.triple())
  }
}
