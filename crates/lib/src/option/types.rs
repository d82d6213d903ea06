use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::option::validate::Violation;

/// The two independent groups of feature flags.
///
/// Each group must have at least one enabled member for a selection to be
/// buildable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionGroup {
  /// AES key-size variants compiled into the library.
  Variant,
  /// Block-cipher modes of operation compiled into the library.
  Mode,
}

impl OptionGroup {
  /// All groups, in the order their rules are checked.
  pub const ALL: [OptionGroup; 2] = [OptionGroup::Variant, OptionGroup::Mode];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Variant => "variant",
      Self::Mode => "mode",
    }
  }

  /// The rule violated when no member of this group is enabled.
  pub fn violation(&self) -> Violation {
    match self {
      Self::Variant => Violation::NoVariantSelected,
      Self::Mode => Violation::NoModeSelected,
    }
  }

  /// Options belonging to this group, in declaration order.
  pub fn members(self) -> impl Iterator<Item = OptionKey> {
    OPTIONS.iter().filter(move |decl| decl.group == self).map(|decl| decl.key)
  }
}

impl fmt::Display for OptionGroup {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

/// One of the six fixed feature flags.
///
/// Variant order is the declaration order of [`OPTIONS`]; `Ord` follows it so
/// maps keyed by `OptionKey` iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionKey {
  #[serde(rename = "TINYAES_ENABLE_AES128")]
  Aes128,
  #[serde(rename = "TINYAES_ENABLE_AES192")]
  Aes192,
  #[serde(rename = "TINYAES_ENABLE_AES256")]
  Aes256,
  #[serde(rename = "TINYAES_ENABLE_CBC")]
  Cbc,
  #[serde(rename = "TINYAES_ENABLE_ECB")]
  Ecb,
  #[serde(rename = "TINYAES_ENABLE_CTR")]
  Ctr,
}

impl OptionKey {
  pub const COUNT: usize = 6;

  /// Position of this option in [`OPTIONS`].
  pub fn index(self) -> usize {
    self as usize
  }

  pub fn decl(self) -> &'static OptionDecl {
    &OPTIONS[self.index()]
  }

  /// The option name, which doubles as its preprocessor definition.
  pub fn name(self) -> &'static str {
    self.decl().name
  }

  pub fn group(self) -> OptionGroup {
    self.decl().group
  }

  /// All options in declaration order.
  pub fn all() -> impl Iterator<Item = OptionKey> {
    OPTIONS.iter().map(|decl| decl.key)
  }
}

impl fmt::Display for OptionKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.name())
  }
}

impl FromStr for OptionKey {
  type Err = OptionError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OPTIONS
      .iter()
      .find(|decl| decl.name == s)
      .map(|decl| decl.key)
      .ok_or_else(|| OptionError::UnknownOption(s.to_string()))
  }
}

/// Static declaration of a single option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OptionDecl {
  pub key: OptionKey,
  pub name: &'static str,
  pub group: OptionGroup,
  pub default: bool,
  pub description: &'static str,
}

/// The option table. Entry `i` declares the `OptionKey` with index `i`.
pub static OPTIONS: [OptionDecl; OptionKey::COUNT] = [
  OptionDecl {
    key: OptionKey::Aes128,
    name: "TINYAES_ENABLE_AES128",
    group: OptionGroup::Variant,
    default: true,
    description: "enable AES128",
  },
  OptionDecl {
    key: OptionKey::Aes192,
    name: "TINYAES_ENABLE_AES192",
    group: OptionGroup::Variant,
    default: false,
    description: "enable AES192",
  },
  OptionDecl {
    key: OptionKey::Aes256,
    name: "TINYAES_ENABLE_AES256",
    group: OptionGroup::Variant,
    default: false,
    description: "enable AES256",
  },
  OptionDecl {
    key: OptionKey::Cbc,
    name: "TINYAES_ENABLE_CBC",
    group: OptionGroup::Mode,
    default: true,
    description: "enable AES encryption in CBC-mode of operation",
  },
  OptionDecl {
    key: OptionKey::Ecb,
    name: "TINYAES_ENABLE_ECB",
    group: OptionGroup::Mode,
    default: true,
    description: "enable the basic ECB 16-byte block algorithm",
  },
  OptionDecl {
    key: OptionKey::Ctr,
    name: "TINYAES_ENABLE_CTR",
    group: OptionGroup::Mode,
    default: true,
    description: "enable encryption in counter-mode",
  },
];

/// Errors raised while turning caller input into option overrides.
#[derive(Debug, Error)]
pub enum OptionError {
  #[error("unknown option: {0}")]
  UnknownOption(String),

  #[error("invalid value '{value}' for option {name}: expected a boolean")]
  InvalidValue { name: String, value: String },

  #[error("malformed override '{0}': expected NAME=VALUE")]
  Malformed(String),

  #[error("failed to read options file {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse options file {path}: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Parse a boolean option value.
///
/// Accepts `true/false`, `1/0`, `yes/no` and `on/off`, case-insensitively.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, OptionError> {
  match value.trim().to_ascii_lowercase().as_str() {
    "true" | "1" | "yes" | "on" => Ok(true),
    "false" | "0" | "no" | "off" => Ok(false),
    _ => Err(OptionError::InvalidValue {
      name: name.to_string(),
      value: value.to_string(),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn table_index_matches_key() {
    for (i, decl) in OPTIONS.iter().enumerate() {
      assert_eq!(decl.key.index(), i, "{} is declared out of order", decl.name);
    }
  }

  #[test]
  fn names_are_unique() {
    let mut names: Vec<_> = OPTIONS.iter().map(|d| d.name).collect();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), OptionKey::COUNT);
  }

  #[test]
  fn groups_have_three_members_each() {
    let variants: Vec<_> = OptionGroup::Variant.members().collect();
    let modes: Vec<_> = OptionGroup::Mode.members().collect();

    assert_eq!(variants, vec![OptionKey::Aes128, OptionKey::Aes192, OptionKey::Aes256]);
    assert_eq!(modes, vec![OptionKey::Cbc, OptionKey::Ecb, OptionKey::Ctr]);
  }

  #[test]
  fn from_str_accepts_declared_names_only() {
    assert_eq!("TINYAES_ENABLE_CTR".parse::<OptionKey>().unwrap(), OptionKey::Ctr);

    // The bare mode names are not option keys
    for bare in ["CBC", "ECB", "CTR"] {
      assert!(matches!(bare.parse::<OptionKey>(), Err(OptionError::UnknownOption(_))));
    }
  }

  #[test]
  fn serde_name_matches_table_name() {
    for key in OptionKey::all() {
      let json = serde_json::to_string(&key).unwrap();
      assert_eq!(json, format!("\"{}\"", key.name()));
    }
  }

  #[test]
  fn parse_bool_spellings() {
    for v in ["true", "True", "1", "YES", "on"] {
      assert!(parse_bool("X", v).unwrap());
    }
    for v in ["false", "False", "0", "no", "OFF"] {
      assert!(!parse_bool("X", v).unwrap());
    }
    assert!(matches!(parse_bool("X", "maybe"), Err(OptionError::InvalidValue { .. })));
  }
}
