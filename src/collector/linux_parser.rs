//! Zero-coalescing facade over the system and process readers.
//!
//! `LinuxParser` keeps the classic monitor contract: every accessor returns a
//! plain value and falls back to `0`, `0.0`, `""`, `"0"` or an empty vector
//! when its source is unreadable or malformed. Callers that need to tell
//! absence from zero use `system()` and `process()` instead.

use std::fmt::Display;

use tracing::{debug, warn};

use crate::collector::config::ParserConfig;
use crate::collector::procfs::{CollectError, ProcessReader, SystemReader};
use crate::collector::traits::FileSystem;

/// Value of the `ram()` accessor when `VmSize` is not available.
const NO_RAM: &str = "0";

/// Facade combining the system and process readers.
pub struct LinuxParser<F: FileSystem + Clone> {
    system: SystemReader<F>,
    process: ProcessReader<F>,
}

impl<F: FileSystem + Clone> LinuxParser<F> {
    /// Creates a new parser.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `config` - Paths and clock-tick rate
    pub fn new(fs: F, config: ParserConfig) -> Self {
        Self {
            system: SystemReader::new(fs.clone(), config.clone()),
            process: ProcessReader::new(fs, config),
        }
    }

    /// Fallible system-wide reader.
    pub fn system(&self) -> &SystemReader<F> {
        &self.system
    }

    /// Fallible per-process reader.
    pub fn process(&self) -> &ProcessReader<F> {
        &self.process
    }

    pub fn config(&self) -> &ParserConfig {
        self.system.config()
    }

    // ============ System identity ============

    pub fn operating_system(&self) -> String {
        or_default("operating_system", None, self.system.operating_system())
    }

    pub fn kernel(&self) -> String {
        or_default("kernel", None, self.system.kernel())
    }

    // ============ Enumeration ============

    /// Best-effort pid list; see `SystemReader::pids`.
    pub fn pids(&self) -> Vec<u32> {
        or_default("pids", None, self.system.pids())
    }

    pub fn total_processes(&self) -> u64 {
        or_default("total_processes", None, self.system.total_processes())
    }

    pub fn running_processes(&self) -> u64 {
        or_default("running_processes", None, self.system.running_processes())
    }

    // ============ CPU ============

    /// Aggregate `cpu` line counters as text. May be short or empty.
    pub fn cpu_utilization(&self) -> Vec<String> {
        or_default("cpu_utilization", None, self.system.cpu_fields())
    }

    pub fn active_jiffies(&self) -> u64 {
        or_default("active_jiffies", None, self.system.active_jiffies())
    }

    pub fn idle_jiffies(&self) -> u64 {
        or_default("idle_jiffies", None, self.system.idle_jiffies())
    }

    pub fn jiffies(&self) -> u64 {
        self.active_jiffies() + self.idle_jiffies()
    }

    pub fn active_jiffies_for(&self, pid: u32) -> u64 {
        or_default("active_jiffies", Some(pid), self.process.active_jiffies(pid))
    }

    /// `[utime, stime, cutime, cstime, starttime]` as text.
    pub fn cpu_utilization_for(&self, pid: u32) -> Vec<String> {
        or_default("cpu_utilization", Some(pid), self.process.cpu_fields(pid))
    }

    // ============ Memory ============

    /// Occupancy ratio `(MemTotal - MemFree) / MemTotal`.
    pub fn memory_utilization(&self) -> f64 {
        or_default("memory_utilization", None, self.system.memory_utilization())
    }

    /// Used ratio excluding buffers and page cache.
    pub fn memory_used_ratio(&self) -> f64 {
        or_default("memory_used_ratio", None, self.system.memory_used_ratio())
    }

    // ============ Uptime ============

    pub fn uptime(&self) -> u64 {
        or_default("uptime", None, self.system.uptime())
    }

    /// Seconds after boot at which `pid` started.
    pub fn uptime_for(&self, pid: u32) -> u64 {
        or_default("uptime", Some(pid), self.process.start_seconds(pid))
    }

    // ============ Process detail ============

    pub fn command(&self, pid: u32) -> String {
        or_default("command", Some(pid), self.process.command(pid))
    }

    pub fn ram(&self, pid: u32) -> String {
        self.process.ram(pid).unwrap_or_else(|e| {
            log_fallback("ram", Some(pid), &e);
            NO_RAM.to_string()
        })
    }

    pub fn uid(&self, pid: u32) -> String {
        or_default("uid", Some(pid), self.process.uid(pid))
    }

    pub fn user(&self, pid: u32) -> String {
        or_default("user", Some(pid), self.process.user(pid))
    }
}

fn or_default<T: Default>(what: &str, pid: Option<u32>, result: Result<T, CollectError>) -> T {
    result.unwrap_or_else(|e| {
        log_fallback(what, pid, &e);
        T::default()
    })
}

fn log_fallback(what: &str, pid: Option<u32>, error: &CollectError) {
    let subject: &dyn Display = match &pid {
        Some(pid) => pid,
        None => &"system",
    };
    match error {
        CollectError::Parse(_) => warn!("{} ({}): {}, using default", what, subject, error),
        _ => debug!("{} ({}): {}, using default", what, subject, error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn parser(fs: MockFs) -> LinuxParser<MockFs> {
        LinuxParser::new(fs, ParserConfig::default().with_ticks_per_second(100))
    }

    #[test]
    fn test_system_identity() {
        let linux = parser(MockFs::typical_system());
        assert_eq!(linux.operating_system(), "Ubuntu 22.04.3 LTS");
        assert_eq!(linux.kernel(), "5.15.0-91-generic");
    }

    #[test]
    fn test_pids_exclude_named_entries() {
        let linux = parser(MockFs::typical_system());
        let mut pids = linux.pids();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 1000, 1001]);
    }

    #[test]
    fn test_jiffies_sum() {
        let linux = parser(MockFs::typical_system());
        assert_eq!(linux.cpu_utilization().len(), 10);
        assert_eq!(linux.active_jiffies(), 13800);
        assert_eq!(linux.idle_jiffies(), 81000);
        assert_eq!(linux.jiffies(), linux.active_jiffies() + linux.idle_jiffies());
    }

    #[test]
    fn test_memory_utilization() {
        let linux = parser(MockFs::typical_system());
        let ratio = linux.memory_utilization();
        assert!((0.0..=1.0).contains(&ratio));
        assert!((ratio - 0.5).abs() < 1e-9);
        assert!(linux.memory_used_ratio() < ratio);
    }

    #[test]
    fn test_memory_utilization_all_free() {
        let mut fs = MockFs::new();
        fs.add_file(
            "/proc/meminfo",
            "MemTotal: 4096 kB\nMemFree: 4096 kB\nSwapCached: 0 kB\n",
        );
        assert_eq!(parser(fs).memory_utilization(), 0.0);
    }

    #[test]
    fn test_process_details() {
        let linux = parser(MockFs::typical_system());

        assert_eq!(linux.command(1), "/sbin/init\0splash\0");
        assert_eq!(linux.ram(1001), "200.00");
        assert_eq!(linux.uid(1001), "1000");
        assert_eq!(linux.user(1001), "alice");
        assert_eq!(linux.active_jiffies_for(1001), 325);
        assert_eq!(
            linux.cpu_utilization_for(1001),
            vec!["250", "75", "0", "0", "200000"]
        );
        assert_eq!(linux.uptime_for(1001), 2000);
    }

    #[test]
    fn test_user_round_trip() {
        let mut fs = MockFs::new();
        fs.add_file("/etc/passwd", "alice:x:1000:1000:...\n");
        fs.add_process(
            4242,
            "4242 (sh) S 1 4242 4242 0 -1 0 0 0 0 0 1 1 0 0 20 0 1 0 1000 0 0",
            "Name:\tsh\nUid:\t1000\n",
            "sh\0",
        );
        let linux = parser(fs);

        assert_eq!(linux.user(4242), "alice");
        assert_eq!(linux.uptime_for(4242), 10);
    }

    #[test]
    fn test_missing_files_yield_defaults() {
        let linux = parser(MockFs::new());

        assert_eq!(linux.operating_system(), "");
        assert_eq!(linux.kernel(), "");
        assert!(linux.pids().is_empty());
        assert!(linux.cpu_utilization().is_empty());
        assert_eq!(linux.jiffies(), 0);
        assert_eq!(linux.memory_utilization(), 0.0);
        assert_eq!(linux.uptime(), 0);
        assert_eq!(linux.total_processes(), 0);
        assert_eq!(linux.running_processes(), 0);
    }

    #[test]
    fn test_gone_process_yields_defaults() {
        let linux = parser(MockFs::typical_system());

        assert_eq!(linux.active_jiffies_for(31337), 0);
        assert!(linux.cpu_utilization_for(31337).is_empty());
        assert_eq!(linux.uptime_for(31337), 0);
        assert_eq!(linux.command(31337), "");
        assert_eq!(linux.ram(31337), "0");
        assert_eq!(linux.uid(31337), "");
        assert_eq!(linux.user(31337), "");
    }

    #[test]
    fn test_malformed_records_yield_defaults() {
        let linux = parser(MockFs::with_malformed_records());

        assert_eq!(linux.operating_system(), "");
        assert_eq!(linux.kernel(), "");
        assert_eq!(linux.uptime(), 0);
        assert_eq!(linux.memory_utilization(), 0.0);
        assert_eq!(linux.cpu_utilization().len(), 3);
        assert_eq!(linux.jiffies(), 0);
        assert_eq!(linux.ram(2), "0");
        assert_eq!(linux.active_jiffies_for(3), 0);
        assert_eq!(linux.user(2), "");
        assert_eq!(linux.user(3), "alice");
    }

    #[test]
    fn test_real_fs_with_relocated_paths() {
        use crate::collector::traits::RealFs;
        use std::fs;

        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proc");
        fs::create_dir_all(root.join("4242")).unwrap();
        fs::create_dir_all(root.join("self")).unwrap();
        fs::write(
            root.join("4242").join("stat"),
            "4242 (sh) S 1 4242 4242 0 -1 0 0 0 0 0 1 1 0 0 20 0 1 0 1000 0 0",
        )
        .unwrap();
        fs::write(
            root.join("4242").join("status"),
            "Name:\tsh\nUid:\t1000\t1000\t1000\t1000\nVmSize:\t    2048 kB\n",
        )
        .unwrap();
        let passwd = dir.path().join("passwd");
        let accounts = "root:x:0:0::/root:/bin/sh\nalice:x:1000:1000::/home/alice:/bin/sh\n";
        fs::write(&passwd, accounts).unwrap();

        let config = ParserConfig::default()
            .with_proc_root(&root)
            .with_passwd_path(&passwd)
            .with_ticks_per_second(100);
        let linux = LinuxParser::new(RealFs::new(), config);

        assert_eq!(linux.pids(), vec![4242]);
        assert_eq!(linux.uptime_for(4242), 10);
        assert_eq!(linux.user(4242), "alice");
        assert_eq!(linux.ram(4242), "2.00");
    }

    #[test]
    fn test_fallible_readers_distinguish_absence() {
        let linux = parser(MockFs::typical_system());

        assert!(matches!(
            linux.process().ram(31337),
            Err(CollectError::ProcessGone(31337))
        ));
        assert_eq!(linux.system().uptime().unwrap(), 12345);
    }
}
