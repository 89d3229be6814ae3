//! procfacts - point-in-time system and process facts from `/proc`.
//!
//! This library is the data-acquisition layer of a system monitor. It reads
//! the Linux process-information pseudo-files and returns plain values:
//! CPU tick counters, memory occupancy, the process list, per-process
//! command lines, sizes, owners and start times.
//!
//! The `procfacts` binary is a thin caller that prints one or more samples.

pub mod collector;
pub mod util;
