//! Option model.
//!
//! Six boolean feature flags in two groups (key-size variants and modes of
//! operation), declared once in a static table. Everything that needs an
//! option name or its group reads it from [`OPTIONS`] so the validation rules
//! and the derived definitions cannot drift apart.
//!
//! # Submodules
//!
//! - `types` - The option table, keys, groups and parse errors
//! - `selection` - Fully resolved `Selection` and partial `SelectionOverrides`
//! - `validate` - Buildability rules

mod selection;
mod types;
mod validate;

pub use selection::*;
pub use types::*;
pub use validate::*;
