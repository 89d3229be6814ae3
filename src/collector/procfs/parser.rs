//! Parsers for `/proc` and `/etc` files.
//!
//! These are pure functions that parse the content of the pseudo-files this
//! crate understands into structured data. They are designed to be easily
//! testable with string inputs.

use serde::Serialize;
use std::collections::HashMap;

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

// ============ os-release ============

/// Parses an os-release file into a map of `KEY -> value`.
///
/// Format: `KEY=value` or `KEY="value"`, one per line. Surrounding quotes
/// are removed. The first occurrence of a key wins.
pub fn parse_os_release(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = unquote(value.trim());
            map.entry(key.trim().to_string())
                .or_insert_with(|| value.to_string());
        }
    }
    map
}

fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|v| v.strip_suffix(quote))
        {
            return inner;
        }
    }
    value.trim_matches(|c| c == '"' || c == '\'')
}

// ============ /proc/version ============

/// Parses `/proc/version` and returns the kernel release.
///
/// Format: `Linux version <release> ...`; the release is the third token of
/// the first line.
pub fn parse_kernel_release(content: &str) -> Result<String, ParseError> {
    let first_line = content.lines().next().unwrap_or("");
    first_line
        .split_whitespace()
        .nth(2)
        .map(str::to_string)
        .ok_or_else(|| ParseError::new("version line has fewer than 3 tokens"))
}

// ============ /proc/stat ============

/// Number of time counters on the aggregate `cpu` line.
pub const CPU_STATE_COUNT: usize = 10;

/// Aggregate CPU time counters from `/proc/stat`, in clock ticks since boot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuTimes {
    pub user: u64,
    pub nice: u64,
    pub system: u64,
    pub idle: u64,
    pub iowait: u64,
    pub irq: u64,
    pub softirq: u64,
    pub steal: u64,
    pub guest: u64,
    pub guest_nice: u64,
}

impl CpuTimes {
    /// Builds the record from the textual counters of the `cpu` line.
    ///
    /// All ten counters must be present and parse as non-negative integers.
    /// Trailing counters added by newer kernels are ignored.
    pub fn from_fields<S: AsRef<str>>(fields: &[S]) -> Result<Self, ParseError> {
        if fields.len() < CPU_STATE_COUNT {
            return Err(ParseError::new(format!(
                "not enough cpu counters: expected {}, got {}",
                CPU_STATE_COUNT,
                fields.len()
            )));
        }

        let mut values = [0u64; CPU_STATE_COUNT];
        for (idx, (slot, field)) in values.iter_mut().zip(fields).enumerate() {
            let field: &str = field.as_ref();
            *slot = field
                .parse()
                .map_err(|_| ParseError::new(format!("invalid cpu counter {}", idx)))?;
        }

        let [
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        ] = values;

        Ok(Self {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
            guest,
            guest_nice,
        })
    }

    /// Ticks spent doing work.
    ///
    /// `guest` and `guest_nice` are summed alongside `user` and `nice`. Kernels
    /// already account guest time inside `user`, so this overstates activity
    /// on hosts running virtual machines. The sum is kept as-is so totals stay
    /// comparable with other monitors built on the same accounting.
    pub fn active(&self) -> u64 {
        self.user
            + self.nice
            + self.system
            + self.irq
            + self.softirq
            + self.steal
            + self.guest
            + self.guest_nice
    }

    /// Ticks spent idle or waiting for I/O.
    pub fn idle(&self) -> u64 {
        self.idle + self.iowait
    }

    /// All ticks since boot: `active() + idle()`.
    pub fn total(&self) -> u64 {
        self.active() + self.idle()
    }

    /// Busy fraction between `previous` and `self`, in `[0, 1]`.
    ///
    /// Returns `None` when no ticks elapsed or the counters went backwards.
    pub fn utilization_since(&self, previous: &CpuTimes) -> Option<f64> {
        let total = self.total().checked_sub(previous.total())?;
        if total == 0 {
            return None;
        }
        let active = self.active().saturating_sub(previous.active());
        Some((active as f64 / total as f64).min(1.0))
    }
}

/// Global stats from `/proc/stat`.
#[derive(Debug, Clone, Default)]
pub struct GlobalStat {
    /// Tokens of the aggregate `cpu` line, without the `cpu` label.
    pub cpu_fields: Vec<String>,
    /// Forks since boot (`processes`).
    pub processes: Option<u64>,
    /// Runnable tasks (`procs_running`).
    pub procs_running: Option<u64>,
}

impl GlobalStat {
    /// Parses the aggregate CPU counters.
    pub fn cpu_times(&self) -> Result<CpuTimes, ParseError> {
        if self.cpu_fields.is_empty() {
            return Err(ParseError::new("missing aggregate cpu line"));
        }
        CpuTimes::from_fields(&self.cpu_fields)
    }
}

/// Parses `/proc/stat` content.
///
/// Lines that are not understood are skipped; missing lines leave the
/// corresponding field empty.
pub fn parse_global_stat(content: &str) -> GlobalStat {
    let mut stat = GlobalStat::default();

    for line in content.lines() {
        let mut parts = line.split(' ').filter(|token| !token.is_empty());
        let Some(label) = parts.next() else {
            continue;
        };

        match label {
            "cpu" if stat.cpu_fields.is_empty() => {
                stat.cpu_fields = parts.map(str::to_string).collect();
            }
            "processes" => stat.processes = parts.next().and_then(|v| v.parse().ok()),
            "procs_running" => stat.procs_running = parts.next().and_then(|v| v.parse().ok()),
            _ => {}
        }
    }

    stat
}

// ============ /proc/meminfo ============

/// Label that ends the portion of `/proc/meminfo` this crate reads.
pub const MEMINFO_SENTINEL: &str = "SwapCached";

/// Ordered memory counters from `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MemCounters {
    counters: Vec<(String, u64)>,
}

impl MemCounters {
    /// Number of counters read.
    pub fn len(&self) -> usize {
        self.counters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }

    /// Value of the counter at `idx` in file order.
    pub fn at(&self, idx: usize) -> Option<u64> {
        self.counters.get(idx).map(|(_, value)| *value)
    }

    /// Value of the counter named `label`.
    pub fn get(&self, label: &str) -> Option<u64> {
        self.counters
            .iter()
            .find(|(name, _)| name == label)
            .map(|(_, value)| *value)
    }

    /// `(MemTotal - MemFree) / MemTotal`, from the first two counters.
    ///
    /// This is an occupancy ratio: buffers and page cache count as used.
    pub fn occupancy_ratio(&self) -> Result<f64, ParseError> {
        let (total, free) = self.total_and_free()?;
        Ok(total.saturating_sub(free) as f64 / total as f64)
    }

    /// `(MemTotal - MemFree - Buffers - Cached) / MemTotal`.
    ///
    /// Reclaimable cache is treated as free. Missing `Buffers` or `Cached`
    /// counters count as zero.
    pub fn used_ratio(&self) -> Result<f64, ParseError> {
        let (total, free) = self.total_and_free()?;
        let reclaimable = self.get("Buffers").unwrap_or(0) + self.get("Cached").unwrap_or(0);
        let used = total.saturating_sub(free).saturating_sub(reclaimable);
        Ok(used as f64 / total as f64)
    }

    fn total_and_free(&self) -> Result<(u64, u64), ParseError> {
        let (Some(total), Some(free)) = (self.at(0), self.at(1)) else {
            return Err(ParseError::new(format!(
                "not enough memory counters: expected 2+, got {}",
                self.len()
            )));
        };
        if total == 0 {
            return Err(ParseError::new("MemTotal is zero"));
        }
        Ok((total, free))
    }
}

/// Parses `/proc/meminfo` content up to and including `SwapCached`.
///
/// Format: `Label:   value kB`, one per line.
pub fn parse_meminfo(content: &str) -> Result<MemCounters, ParseError> {
    let mut counters = Vec::new();

    for line in content.lines() {
        let mut parts = line.split_whitespace();
        let Some(label) = parts.next() else {
            continue;
        };
        let label = label.trim_end_matches(':');
        let value: u64 = parts
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| ParseError::new(format!("invalid meminfo value for {}", label)))?;

        counters.push((label.to_string(), value));
        if label == MEMINFO_SENTINEL {
            break;
        }
    }

    Ok(MemCounters { counters })
}

// ============ /proc/uptime ============

/// Parses `/proc/uptime` and returns whole seconds since boot.
///
/// Format: `<uptime> <idle>` as floating seconds; the fraction is truncated.
pub fn parse_uptime(content: &str) -> Result<u64, ParseError> {
    let seconds: f64 = content
        .split_whitespace()
        .next()
        .ok_or_else(|| ParseError::new("empty uptime"))?
        .parse()
        .map_err(|_| ParseError::new("invalid uptime"))?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ParseError::new("uptime out of range"));
    }
    Ok(seconds.trunc() as u64)
}

// ============ /proc/[pid]/stat ============

/// Named fields of `/proc/[pid]/stat`.
///
/// `position()` is the single mapping from names to 0-indexed positions on
/// the line; see proc(5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatField {
    Pid,
    Comm,
    State,
    Utime,
    Stime,
    Cutime,
    Cstime,
    Starttime,
}

impl StatField {
    pub const fn position(self) -> usize {
        match self {
            StatField::Pid => 0,
            StatField::Comm => 1,
            StatField::State => 2,
            StatField::Utime => 13,
            StatField::Stime => 14,
            StatField::Cutime => 15,
            StatField::Cstime => 16,
            StatField::Starttime => 21,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            StatField::Pid => "pid",
            StatField::Comm => "comm",
            StatField::State => "state",
            StatField::Utime => "utime",
            StatField::Stime => "stime",
            StatField::Cutime => "cutime",
            StatField::Cstime => "cstime",
            StatField::Starttime => "starttime",
        }
    }
}

/// Fields surfaced for per-process CPU accounting, in output order.
pub const PID_CPU_FIELDS: [StatField; 5] = [
    StatField::Utime,
    StatField::Stime,
    StatField::Cutime,
    StatField::Cstime,
    StatField::Starttime,
];

/// Parsed `/proc/[pid]/stat` record.
///
/// Keeps the raw text of every field; numeric accessors parse on demand.
#[derive(Debug, Clone, Default)]
pub struct PidStat {
    fields: Vec<String>,
}

impl PidStat {
    /// Raw text of `field`.
    pub fn field(&self, field: StatField) -> Option<&str> {
        self.fields.get(field.position()).map(String::as_str)
    }

    pub fn comm(&self) -> &str {
        self.field(StatField::Comm).unwrap_or("")
    }

    pub fn utime(&self) -> Result<u64, ParseError> {
        self.parse_field(StatField::Utime)
    }

    pub fn stime(&self) -> Result<u64, ParseError> {
        self.parse_field(StatField::Stime)
    }

    /// Waited-for children's user time. Signed per proc(5).
    pub fn cutime(&self) -> Result<i64, ParseError> {
        self.parse_field(StatField::Cutime)
    }

    /// Waited-for children's system time. Signed per proc(5).
    pub fn cstime(&self) -> Result<i64, ParseError> {
        self.parse_field(StatField::Cstime)
    }

    /// Ticks after boot at which the process started.
    pub fn starttime(&self) -> Result<u64, ParseError> {
        self.parse_field(StatField::Starttime)
    }

    /// `utime + stime + cutime + cstime`, negative child times counted as 0.
    pub fn active_jiffies(&self) -> Result<u64, ParseError> {
        let children = self.cutime()?.max(0) as u64 + self.cstime()?.max(0) as u64;
        Ok(self.utime()? + self.stime()? + children)
    }

    /// Raw text of `[utime, stime, cutime, cstime, starttime]`.
    pub fn cpu_fields(&self) -> Vec<String> {
        PID_CPU_FIELDS
            .iter()
            .filter_map(|f| self.field(*f).map(str::to_string))
            .collect()
    }

    fn parse_field<T: std::str::FromStr>(&self, field: StatField) -> Result<T, ParseError> {
        self.field(field)
            .ok_or_else(|| ParseError::new(format!("missing field {}", field.name())))?
            .parse()
            .map_err(|_| ParseError::new(format!("invalid {}", field.name())))
    }
}

/// Parses `/proc/[pid]/stat` content.
///
/// The comm field can contain spaces and parentheses, so it is taken as
/// everything between the first `(` and the last `)`.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
pub fn parse_proc_stat(content: &str) -> Result<PidStat, ParseError> {
    let content = content.trim();

    let fields: Vec<String> = match (content.find('('), content.rfind(')')) {
        (Some(open_paren), Some(close_paren)) if open_paren < close_paren => {
            let mut fields = vec![
                content[..open_paren].trim().to_string(),
                content[open_paren + 1..close_paren].to_string(),
            ];
            fields.extend(
                content[close_paren + 1..]
                    .split_whitespace()
                    .map(str::to_string),
            );
            fields
        }
        _ => content.split_whitespace().map(str::to_string).collect(),
    };

    let required = StatField::Starttime.position() + 1;
    if fields.len() < required {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected {}+, got {}",
            required,
            fields.len()
        )));
    }

    Ok(PidStat { fields })
}

// ============ /proc/[pid]/status ============

/// Parsed data from `/proc/[pid]/status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PidStatus {
    /// `VmSize` in kB, absent for kernel threads.
    pub vm_size_kb: Option<u64>,
    /// Real uid, as printed by the kernel.
    pub uid: Option<String>,
}

/// Parses `/proc/[pid]/status` content.
///
/// Format is `Key:\tvalue` pairs, one per line.
pub fn parse_proc_status(content: &str) -> PidStatus {
    let mut status = PidStatus::default();

    for line in content.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        // Memory fields are in kB format: "12345 kB"
        let first = value.split_whitespace().next();
        match key.trim() {
            "VmSize" if status.vm_size_kb.is_none() => {
                status.vm_size_kb = first.and_then(|s| s.parse().ok());
            }
            // Uid has format: real effective saved fs
            "Uid" if status.uid.is_none() => {
                status.uid = first.map(str::to_string);
            }
            _ => {}
        }
    }

    status
}

/// Formats a kB amount as megabytes with two decimals.
pub fn format_kb_as_mb(kb: u64) -> String {
    format!("{:.2}", kb as f64 / 1024.0)
}

// ============ /etc/passwd ============

/// Entry of the account database.
#[derive(Debug, Clone, PartialEq)]
pub struct PasswdEntry {
    pub name: String,
    pub uid: String,
}

/// Parses `/etc/passwd` content in file order.
///
/// Format: username:password:uid:gid:gecos:home:shell. Comments, empty
/// lines and lines with fewer than three fields are skipped.
pub fn parse_passwd(content: &str) -> Vec<PasswdEntry> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let mut parts = line.split(':');
            let name = parts.next()?;
            let _password = parts.next()?;
            let uid = parts.next()?;
            Some(PasswdEntry {
                name: name.to_string(),
                uid: uid.to_string(),
            })
        })
        .collect()
}

/// Returns the first username whose uid field equals `uid`.
pub fn find_user_by_uid(content: &str, uid: &str) -> Option<String> {
    parse_passwd(content)
        .into_iter()
        .find(|entry| entry.uid == uid)
        .map(|entry| entry.name)
}
