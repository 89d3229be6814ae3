//! System facts reader for Linux.
//!
//! This module reads system and process facts from the Linux `/proc`
//! filesystem, with support for mocking so tests never touch the real one.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        LinuxParser                          │
//! │  ┌─────────────────────┐   ┌─────────────────────────────┐  │
//! │  │   ProcessReader     │   │      SystemReader           │  │
//! │  │  - /proc/[pid]/*    │   │  - /proc/stat, meminfo      │  │
//! │  │  - /etc/passwd      │   │  - /proc/uptime, version    │  │
//! │  └──────────┬──────────┘   │  - /etc/os-release          │  │
//! │             │              └──────────────┬──────────────┘  │
//! │             └──────────────┬──────────────┘                 │
//! │                            │                                │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (Linux)     │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production (Linux)
//!
//! ```ignore
//! use procfacts::collector::{LinuxParser, ParserConfig, RealFs};
//!
//! let linux = LinuxParser::new(RealFs::new(), ParserConfig::default());
//! println!("{} running {}", linux.operating_system(), linux.kernel());
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use procfacts::collector::{LinuxParser, MockFs, ParserConfig};
//!
//! let config = ParserConfig::default().with_ticks_per_second(100);
//! let linux = LinuxParser::new(MockFs::typical_system(), config);
//! assert_eq!(linux.jiffies(), linux.active_jiffies() + linux.idle_jiffies());
//! assert_eq!(linux.user(1000), "alice");
//! ```

pub mod config;
mod linux_parser;
pub mod mock;
pub mod procfs;
pub mod traits;

pub use config::ParserConfig;
pub use linux_parser::LinuxParser;
pub use mock::MockFs;
pub use procfs::{CollectError, ProcessReader, SystemReader};
pub use traits::{FileSystem, RealFs};
