use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::de::Error as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::option::types::{OPTIONS, OptionError, OptionKey, parse_bool};

/// Every option resolved to a boolean.
///
/// A `Selection` always holds a value for all six options; absent overrides
/// fall back to the table defaults. It is a plain value and never mutated in
/// place once handed to a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "BTreeMap<OptionKey, bool>", from = "BTreeMap<OptionKey, bool>")]
pub struct Selection {
  values: [bool; OptionKey::COUNT],
}

impl Default for Selection {
  fn default() -> Self {
    let mut values = [false; OptionKey::COUNT];
    for decl in &OPTIONS {
      values[decl.key.index()] = decl.default;
    }
    Self { values }
  }
}

impl Selection {
  /// Merge `overrides` over the defaults.
  pub fn from_overrides(overrides: &SelectionOverrides) -> Self {
    let mut selection = Self::default();
    for (key, value) in overrides.iter() {
      selection.values[key.index()] = value;
    }
    selection
  }

  /// A selection with exactly the given options enabled.
  pub fn only(keys: &[OptionKey]) -> Self {
    let mut values = [false; OptionKey::COUNT];
    for key in keys {
      values[key.index()] = true;
    }
    Self { values }
  }

  pub fn get(&self, key: OptionKey) -> bool {
    self.values[key.index()]
  }

  /// Copy of this selection with `key` set to `value`.
  pub fn with(mut self, key: OptionKey, value: bool) -> Self {
    self.values[key.index()] = value;
    self
  }

  /// All options with their values, in declaration order.
  pub fn iter(&self) -> impl Iterator<Item = (OptionKey, bool)> + '_ {
    OptionKey::all().map(|key| (key, self.get(key)))
  }

  /// Enabled options, in declaration order.
  pub fn enabled(&self) -> impl Iterator<Item = OptionKey> + '_ {
    self.iter().filter(|(_, on)| *on).map(|(key, _)| key)
  }

  pub fn enabled_count(&self) -> usize {
    self.values.iter().filter(|on| **on).count()
  }
}

impl From<Selection> for BTreeMap<OptionKey, bool> {
  fn from(selection: Selection) -> Self {
    selection.iter().collect()
  }
}

impl From<BTreeMap<OptionKey, bool>> for Selection {
  fn from(map: BTreeMap<OptionKey, bool>) -> Self {
    Selection::from_overrides(&SelectionOverrides { values: map })
  }
}

/// Caller-supplied partial mapping of options to values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionOverrides {
  values: BTreeMap<OptionKey, bool>,
}

impl SelectionOverrides {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn set(&mut self, key: OptionKey, value: bool) -> &mut Self {
    self.values.insert(key, value);
    self
  }

  pub fn get(&self, key: OptionKey) -> Option<bool> {
    self.values.get(&key).copied()
  }

  pub fn iter(&self) -> impl Iterator<Item = (OptionKey, bool)> + '_ {
    self.values.iter().map(|(key, value)| (*key, *value))
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  /// Apply `other` on top of `self`; later values win.
  pub fn merge(&mut self, other: &SelectionOverrides) {
    for (key, value) in other.iter() {
      self.values.insert(key, value);
    }
  }

  /// Parse `NAME=VALUE` pairs, e.g. `TINYAES_ENABLE_AES256=true`.
  pub fn parse<I, S>(pairs: I) -> Result<Self, OptionError>
  where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
  {
    let mut overrides = Self::new();
    for pair in pairs {
      let pair = pair.as_ref();
      let (name, value) = pair
        .split_once('=')
        .ok_or_else(|| OptionError::Malformed(pair.to_string()))?;
      let key: OptionKey = name.trim().parse()?;
      overrides.set(key, parse_bool(key.name(), value)?);
    }
    Ok(overrides)
  }

  /// Parse a JSON object mapping option names to booleans.
  ///
  /// Values may be JSON booleans or any string accepted by the
  /// `NAME=VALUE` syntax.
  pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
    let raw: BTreeMap<String, serde_json::Value> = serde_json::from_str(content)?;
    let mut overrides = Self::new();
    for (name, value) in raw {
      let key: OptionKey = name.parse().map_err(serde_json::Error::custom)?;
      let enabled = match &value {
        serde_json::Value::Bool(b) => *b,
        serde_json::Value::String(s) => parse_bool(&name, s).map_err(serde_json::Error::custom)?,
        other => parse_bool(&name, &other.to_string()).map_err(serde_json::Error::custom)?,
      };
      overrides.set(key, enabled);
    }
    Ok(overrides)
  }

  pub fn from_json_file(path: &Path) -> Result<Self, OptionError> {
    debug!(path = %path.display(), "reading options file");
    let content = fs::read_to_string(path).map_err(|source| OptionError::Read {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json_str(&content).map_err(|source| OptionError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }
}
