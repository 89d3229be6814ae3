//! System reader for global facts from `/proc/` and `/etc/`.

use crate::collector::config::{
    MEMINFO_FILENAME, ParserConfig, STAT_FILENAME, UPTIME_FILENAME, VERSION_FILENAME,
};
use crate::collector::procfs::parser::{
    CpuTimes, GlobalStat, MemCounters, parse_global_stat, parse_kernel_release, parse_meminfo,
    parse_os_release, parse_uptime,
};
use crate::collector::procfs::process::CollectError;
use crate::collector::traits::FileSystem;

/// os-release key holding the human-readable distribution name.
const PRETTY_NAME_KEY: &str = "PRETTY_NAME";

/// Reads system-wide facts.
pub struct SystemReader<F: FileSystem> {
    fs: F,
    config: ParserConfig,
}

impl<F: FileSystem> SystemReader<F> {
    /// Creates a new system reader.
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

    /// Distribution name (`PRETTY_NAME`) from the os-release file.
    ///
    /// Underscores in the value are shown as spaces.
    pub fn operating_system(&self) -> Result<String, CollectError> {
        let content = self.fs.read_to_string(&self.config.os_release_path)?;
        parse_os_release(&content)
            .remove(PRETTY_NAME_KEY)
            .map(|name| name.replace('_', " "))
            .ok_or_else(|| CollectError::Missing(PRETTY_NAME_KEY.to_string()))
    }

    /// Kernel release from `/proc/version`.
    pub fn kernel(&self) -> Result<String, CollectError> {
        let content = self.read_proc_file(VERSION_FILENAME)?;
        Ok(parse_kernel_release(&content)?)
    }

    /// Pids of the processes currently listed under the root.
    ///
    /// Enumeration is best-effort: a listed process may exit before it is
    /// read, and one started after the listing is not included. Order is
    /// unspecified.
    pub fn pids(&self) -> Result<Vec<u32>, CollectError> {
        let root = self.config.proc_root();
        let entries = self.fs.read_dir(root)?;

        let pids: Vec<u32> = entries
            .iter()
            .filter(|entry| self.fs.is_dir(entry))
            .filter_map(|entry| entry.file_name().and_then(|n| n.to_str()))
            .filter(|name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|name| name.parse().ok())
            .collect();

        tracing::trace!("listed {} pids under {}", pids.len(), root.display());
        Ok(pids)
    }

    /// Parses `/proc/stat`.
    pub fn global_stat(&self) -> Result<GlobalStat, CollectError> {
        let content = self.read_proc_file(STAT_FILENAME)?;
        Ok(parse_global_stat(&content))
    }

    /// Counters of the aggregate `cpu` line as text, in kernel order.
    pub fn cpu_fields(&self) -> Result<Vec<String>, CollectError> {
        let stat = self.global_stat()?;
        if stat.cpu_fields.is_empty() {
            return Err(CollectError::Missing("aggregate cpu line".to_string()));
        }
        Ok(stat.cpu_fields)
    }

    /// Aggregate CPU time counters.
    pub fn cpu_times(&self) -> Result<CpuTimes, CollectError> {
        Ok(self.global_stat()?.cpu_times()?)
    }

    /// See `CpuTimes::active` for the guest-time accounting caveat.
    pub fn active_jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.active())
    }

    pub fn idle_jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.idle())
    }

    /// Total ticks since boot, from a single read of `/proc/stat`.
    pub fn jiffies(&self) -> Result<u64, CollectError> {
        Ok(self.cpu_times()?.total())
    }

    /// Processes created since boot (`processes`).
    pub fn total_processes(&self) -> Result<u64, CollectError> {
        self.global_stat()?
            .processes
            .ok_or_else(|| CollectError::Missing("processes".to_string()))
    }

    /// Runnable tasks (`procs_running`).
    pub fn running_processes(&self) -> Result<u64, CollectError> {
        self.global_stat()?
            .procs_running
            .ok_or_else(|| CollectError::Missing("procs_running".to_string()))
    }

    /// Memory counters up to `SwapCached`.
    pub fn mem_counters(&self) -> Result<MemCounters, CollectError> {
        let content = self.read_proc_file(MEMINFO_FILENAME)?;
        Ok(parse_meminfo(&content)?)
    }

    /// Occupancy ratio `(MemTotal - MemFree) / MemTotal`.
    ///
    /// Buffers and page cache count as used.
    pub fn memory_utilization(&self) -> Result<f64, CollectError> {
        Ok(self.mem_counters()?.occupancy_ratio()?)
    }

    /// Used ratio with buffers and page cache treated as free.
    pub fn memory_used_ratio(&self) -> Result<f64, CollectError> {
        Ok(self.mem_counters()?.used_ratio()?)
    }

    /// Whole seconds since boot.
    pub fn uptime(&self) -> Result<u64, CollectError> {
        let content = self.read_proc_file(UPTIME_FILENAME)?;
        Ok(parse_uptime(&content)?)
    }

    fn read_proc_file(&self, name: &str) -> Result<String, CollectError> {
        let path = self.config.proc_file(name);
        Ok(self.fs.read_to_string(&path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockFs;

    fn system_reader(fs: MockFs) -> SystemReader<MockFs> {
        SystemReader::new(fs, ParserConfig::default().with_ticks_per_second(100))
    }

    #[test]
    fn test_operating_system() {
        let reader = system_reader(MockFs::typical_system());
        assert_eq!(reader.operating_system().unwrap(), "Ubuntu 22.04.3 LTS");
    }

    #[test]
    fn test_operating_system_without_pretty_name() {
        let reader = system_reader(MockFs::with_malformed_records());
        assert!(matches!(reader.operating_system(), Err(CollectError::Missing(_))));
    }

    #[test]
    fn test_operating_system_restores_spaces() {
        let mut fs = MockFs::new();
        fs.add_file("/etc/os-release", "NAME=Foo\nPRETTY_NAME=\"Foo_Bar Linux\"\n");
        let reader = system_reader(fs);
        assert_eq!(reader.operating_system().unwrap(), "Foo Bar Linux");
    }

    #[test]
    fn test_kernel() {
        let reader = system_reader(MockFs::typical_system());
        assert_eq!(reader.kernel().unwrap(), "5.15.0-91-generic");

        let reader = system_reader(MockFs::with_malformed_records());
        assert!(matches!(reader.kernel(), Err(CollectError::Parse(_))));
    }

    #[test]
    fn test_pids_only_numeric_directories() {
        let mut fs = MockFs::typical_system();
        fs.add_file("/proc/12345", "not a directory");
        fs.add_dir("/proc/12ab");
        let reader = system_reader(fs);

        let mut pids = reader.pids().unwrap();
        pids.sort_unstable();
        assert_eq!(pids, vec![1, 1000, 1001]);
    }

    #[test]
    fn test_pids_skips_overflowing_names() {
        let mut fs = MockFs::new();
        fs.add_dir("/proc/7");
        fs.add_dir("/proc/99999999999999999999");
        let reader = system_reader(fs);

        assert_eq!(reader.pids().unwrap(), vec![7]);
    }

    #[test]
    fn test_cpu_fields() {
        let reader = system_reader(MockFs::typical_system());
        let fields = reader.cpu_fields().unwrap();
        assert_eq!(
            fields,
            vec!["10000", "500", "3000", "80000", "1000", "200", "100", "0", "0", "0"]
        );
    }

    #[test]
    fn test_jiffies() {
        let reader = system_reader(MockFs::typical_system());

        let active = reader.active_jiffies().unwrap();
        let idle = reader.idle_jiffies().unwrap();
        assert_eq!(active, 10000 + 500 + 3000 + 200 + 100);
        assert_eq!(idle, 80000 + 1000);
        assert_eq!(reader.jiffies().unwrap(), active + idle);
    }

    #[test]
    fn test_short_cpu_line_is_absent() {
        let reader = system_reader(MockFs::with_malformed_records());

        assert_eq!(reader.cpu_fields().unwrap(), vec!["10000", "500", "3000"]);
        assert!(matches!(reader.jiffies(), Err(CollectError::Parse(_))));
    }

    #[test]
    fn test_process_counters() {
        let reader = system_reader(MockFs::typical_system());
        assert_eq!(reader.total_processes().unwrap(), 10000);
        assert_eq!(reader.running_processes().unwrap(), 2);

        let reader = system_reader(MockFs::with_malformed_records());
        assert!(matches!(reader.total_processes(), Err(CollectError::Missing(_))));
    }

    #[test]
    fn test_memory_utilization() {
        let reader = system_reader(MockFs::typical_system());

        assert!((reader.memory_utilization().unwrap() - 0.5).abs() < 1e-9);
        let used = (16384000.0 - 8192000.0 - 512000.0 - 2048000.0) / 16384000.0;
        assert!((reader.memory_used_ratio().unwrap() - used).abs() < 1e-9);
    }

    #[test]
    fn test_memory_utilization_single_counter() {
        let reader = system_reader(MockFs::with_malformed_records());
        assert!(matches!(
            reader.memory_utilization(),
            Err(CollectError::Parse(_))
        ));
    }

    #[test]
    fn test_uptime() {
        let reader = system_reader(MockFs::typical_system());
        assert_eq!(reader.uptime().unwrap(), 12345);
    }

    #[test]
    fn test_missing_files() {
        let reader = system_reader(MockFs::new());

        assert!(matches!(reader.uptime(), Err(CollectError::Io(_))));
        assert!(matches!(reader.kernel(), Err(CollectError::Io(_))));
        assert!(matches!(reader.pids(), Err(CollectError::Io(_))));
        assert!(matches!(reader.operating_system(), Err(CollectError::Io(_))));
    }
}
