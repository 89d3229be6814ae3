//! Readers for the Linux `/proc` filesystem.
//!
//! This module provides parsers and readers for the system-wide and
//! per-process pseudo-files. Readers return `Result` so callers can tell a
//! missing value from a zero one.

pub mod parser;
pub mod process;
pub mod system;

pub use parser::{CpuTimes, MemCounters, ParseError, PidStat, PidStatus, StatField};
pub use process::{CollectError, ProcessReader};
pub use system::SystemReader;
