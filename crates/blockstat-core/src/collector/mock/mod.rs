//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for exercising the
//! sampling cycle without a real `/sys/block` tree.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
