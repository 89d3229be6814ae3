//! Locations of the files readers consume and the clock-tick rate.

use std::path::{Path, PathBuf};

use crate::util::ticks_per_second;

/// Default mount point of the process-information filesystem.
pub const DEFAULT_PROC_PATH: &str = "/proc";
/// Default os-release file.
pub const DEFAULT_OS_RELEASE_PATH: &str = "/etc/os-release";
/// Default account database.
pub const DEFAULT_PASSWD_PATH: &str = "/etc/passwd";

pub(crate) const STAT_FILENAME: &str = "stat";
pub(crate) const STATUS_FILENAME: &str = "status";
pub(crate) const CMDLINE_FILENAME: &str = "cmdline";
pub(crate) const MEMINFO_FILENAME: &str = "meminfo";
pub(crate) const UPTIME_FILENAME: &str = "uptime";
pub(crate) const VERSION_FILENAME: &str = "version";

/// Configuration shared by all readers.
///
/// `Default` points at the live system and the runtime clock-tick rate.
/// Tests inject their own paths and tick rate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Root of the process-information filesystem (usually "/proc").
    pub proc_root: PathBuf,
    /// Path to the os-release file.
    pub os_release_path: PathBuf,
    /// Path to the account database.
    pub passwd_path: PathBuf,
    /// Clock ticks per second (USER_HZ) used to convert stat counters.
    pub ticks_per_second: u64,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            proc_root: PathBuf::from(DEFAULT_PROC_PATH),
            os_release_path: PathBuf::from(DEFAULT_OS_RELEASE_PATH),
            passwd_path: PathBuf::from(DEFAULT_PASSWD_PATH),
            ticks_per_second: ticks_per_second(),
        }
    }
}

impl ParserConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_proc_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.proc_root = path.into();
        self
    }

    pub fn with_os_release_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.os_release_path = path.into();
        self
    }

    pub fn with_passwd_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.passwd_path = path.into();
        self
    }

    pub fn with_ticks_per_second(mut self, ticks: u64) -> Self {
        self.ticks_per_second = ticks;
        self
    }

    /// Path of a system-wide file under the root, e.g. `/proc/meminfo`.
    pub(crate) fn proc_file(&self, name: &str) -> PathBuf {
        self.proc_root.join(name)
    }

    /// Path of a per-process file, e.g. `/proc/42/stat`.
    pub(crate) fn pid_file(&self, pid: u32, name: &str) -> PathBuf {
        self.proc_root.join(pid.to_string()).join(name)
    }

    pub(crate) fn proc_root(&self) -> &Path {
        &self.proc_root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = ParserConfig::default();
        assert_eq!(config.proc_root, PathBuf::from("/proc"));
        assert_eq!(config.os_release_path, PathBuf::from("/etc/os-release"));
        assert_eq!(config.passwd_path, PathBuf::from("/etc/passwd"));
        assert!(config.ticks_per_second > 0);
    }

    #[test]
    fn test_builder_overrides() {
        let config = ParserConfig::new()
            .with_proc_root("/tmp/proc")
            .with_os_release_path("/tmp/os-release")
            .with_passwd_path("/tmp/passwd")
            .with_ticks_per_second(250);

        assert_eq!(config.ticks_per_second, 250);
        assert_eq!(config.proc_file("uptime"), PathBuf::from("/tmp/proc/uptime"));
        assert_eq!(config.pid_file(42, "stat"), PathBuf::from("/tmp/proc/42/stat"));
        assert_eq!(config.os_release_path, PathBuf::from("/tmp/os-release"));
        assert_eq!(config.passwd_path, PathBuf::from("/tmp/passwd"));
    }
}
