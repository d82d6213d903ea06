//! Shared utilities.
//!
//! Content hashing for build plans and test helpers.

pub mod hash;

#[cfg(test)]
pub mod testutil;
