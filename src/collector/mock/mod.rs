//! Mock filesystem implementations for testing.
//!
//! This module provides `MockFs` and pre-built scenarios for exercising the
//! readers without access to a real Linux `/proc` filesystem.

mod filesystem;
mod scenarios;

pub use filesystem::MockFs;
