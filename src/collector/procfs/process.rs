//! Process reader for per-process facts from `/proc/[pid]/`.

use crate::collector::config::{CMDLINE_FILENAME, ParserConfig, STAT_FILENAME, STATUS_FILENAME};
use crate::collector::procfs::parser::{
    ParseError, PidStat, PidStatus, find_user_by_uid, format_kb_as_mb, parse_proc_stat,
    parse_proc_status,
};
use crate::collector::traits::FileSystem;
use std::io;

/// Error type for collection failures.
#[derive(Debug)]
pub enum CollectError {
    /// Process disappeared before or during the read.
    ProcessGone(u32),
    /// The record was read but does not carry the requested value.
    Missing(String),
    /// I/O error reading a file.
    Io(io::Error),
    /// Parse error in a file.
    Parse(String),
}

impl std::fmt::Display for CollectError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CollectError::ProcessGone(pid) => write!(f, "process {} disappeared", pid),
            CollectError::Missing(what) => write!(f, "not available: {}", what),
            CollectError::Io(e) => write!(f, "I/O error: {}", e),
            CollectError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for CollectError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CollectError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for CollectError {
    fn from(e: io::Error) -> Self {
        CollectError::Io(e)
    }
}

impl From<ParseError> for CollectError {
    fn from(e: ParseError) -> Self {
        CollectError::Parse(e.message)
    }
}

/// Reads per-process records from `/proc/[pid]/` files.
///
/// Holds no per-process state: every call reads the current record. A pid
/// obtained from enumeration may be gone by the time it is read, which
/// surfaces as `CollectError::ProcessGone`.
pub struct ProcessReader<F: FileSystem> {
    fs: F,
    config: ParserConfig,
}

impl<F: FileSystem> ProcessReader<F> {
    /// Creates a new process reader.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Paths and clock-tick rate
    pub fn new(fs: F, config: ParserConfig) -> Self {
        Self { fs, config }
    }

    /// Returns the configuration this reader was built with.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Reads and parses `/proc/[pid]/stat`.
    pub fn stat(&self, pid: u32) -> Result<PidStat, CollectError> {
        let content = self.read_pid_file(pid, STAT_FILENAME)?;
        Ok(parse_proc_stat(&content)?)
    }

    /// Reads and parses `/proc/[pid]/status`.
    pub fn status(&self, pid: u32) -> Result<PidStatus, CollectError> {
        let content = self.read_pid_file(pid, STATUS_FILENAME)?;
        Ok(parse_proc_status(&content))
    }

    /// `utime + stime + cutime + cstime` in clock ticks.
    pub fn active_jiffies(&self, pid: u32) -> Result<u64, CollectError> {
        Ok(self.stat(pid)?.active_jiffies()?)
    }

    /// Raw `[utime, stime, cutime, cstime, starttime]` counters as text.
    ///
    /// The caller turns these into a CPU percentage with its own sampling
    /// interval and clock-tick rate.
    pub fn cpu_fields(&self, pid: u32) -> Result<Vec<String>, CollectError> {
        Ok(self.stat(pid)?.cpu_fields())
    }

    /// Seconds after boot at which the process started.
    ///
    /// Subtract from the system uptime to get the process age.
    pub fn start_seconds(&self, pid: u32) -> Result<u64, CollectError> {
        let starttime = self.stat(pid)?.starttime()?;
        starttime
            .checked_div(self.config.ticks_per_second)
            .ok_or_else(|| CollectError::Missing("clock tick rate is zero".to_string()))
    }

    /// First line of `/proc/[pid]/cmdline`, NUL separators preserved.
    pub fn command(&self, pid: u32) -> Result<String, CollectError> {
        let content = self.read_pid_file(pid, CMDLINE_FILENAME)?;
        Ok(content.lines().next().unwrap_or("").to_string())
    }

    /// Argument vector from `/proc/[pid]/cmdline`.
    ///
    /// Empty for kernel threads.
    pub fn argv(&self, pid: u32) -> Result<Vec<String>, CollectError> {
        let content = self.read_pid_file(pid, CMDLINE_FILENAME)?;
        Ok(content
            .split('\0')
            .filter(|arg| !arg.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// `VmSize` in kB.
    pub fn vm_size_kb(&self, pid: u32) -> Result<u64, CollectError> {
        self.status(pid)?
            .vm_size_kb
            .ok_or_else(|| CollectError::Missing(format!("VmSize of process {}", pid)))
    }

    /// `VmSize` formatted as megabytes with two decimals.
    pub fn ram(&self, pid: u32) -> Result<String, CollectError> {
        Ok(format_kb_as_mb(self.vm_size_kb(pid)?))
    }

    /// Real uid of the process, as printed in `/proc/[pid]/status`.
    pub fn uid(&self, pid: u32) -> Result<String, CollectError> {
        self.status(pid)?
            .uid
            .ok_or_else(|| CollectError::Missing(format!("Uid of process {}", pid)))
    }

    /// Username owning the process, resolved through the account database.
    pub fn user(&self, pid: u32) -> Result<String, CollectError> {
        let uid = self.uid(pid)?;
        let passwd = self.fs.read_to_string(&self.config.passwd_path)?;
        find_user_by_uid(&passwd, &uid)
            .ok_or_else(|| CollectError::Missing(format!("account for uid {}", uid)))
    }

    fn read_pid_file(&self, pid: u32, name: &str) -> Result<String, CollectError> {
        let path = self.config.pid_file(pid, name);
        self.fs.read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CollectError::ProcessGone(pid),
            _ => CollectError::Io(e),
        })
    }
}
