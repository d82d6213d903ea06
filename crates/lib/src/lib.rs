//! aespkg-lib: Package build descriptor for the tiny-AES-c native library.
//!
//! This crate owns everything between a caller's option choices and a
//! consumable package directory:
//! - `option`: the static option table, `Selection` and its validation
//! - `build`: definitions, `BuildPlan`, and the build backend abstraction
//! - `package`: the artifact layout and the packaging step
//! - `descriptor`: static recipe metadata and `package_info`
//! - `lifecycle`: the configure → build → package state machine

pub mod build;
pub mod consts;
pub mod descriptor;
pub mod lifecycle;
pub mod option;
pub mod package;
pub mod platform;
pub mod util;
