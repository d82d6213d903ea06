//! Build definition and execution.
//!
//! A validated `Selection` becomes an ordered list of `Definition`s, which is
//! paired with platform settings and a toolchain description into a
//! `BuildPlan`. The plan is handed to a `BuildBackend`, the external
//! capability that actually compiles the library.
//!
//! # Submodules
//!
//! - [`backend`] - The `BuildBackend` trait
//! - [`cmake`] - Default backend driving the `cmake` executable
//! - [`definitions`] - Selection to definition translation
//! - [`execute`] - The configure and build stages

pub mod backend;
pub mod cmake;
pub mod definitions;
pub mod execute;
mod types;

pub use backend::BuildBackend;
pub use cmake::CmakeBackend;
pub use definitions::derive_definitions;
pub use execute::{build, configure};
pub use types::*;
