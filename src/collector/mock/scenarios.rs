//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` and `/etc` states for the
//! readers and the facade.

use super::filesystem::MockFs;

/// Stat line of a kernel-style init process: utime=1000 stime=500
/// cutime=2000 cstime=1000 starttime=1.
const INIT_STAT: &str = "1 (systemd) S 0 1 1 0 -1 4194560 50000 1000000 100 500 1000 500 2000 1000 20 0 1 0 1 170000000 3000 18446744073709551615 0 0 0 0 0 0 0 0 1073745152 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0";

/// Stat line of a login shell: utime=100 stime=50 cutime=200 cstime=100
/// starttime=100000.
const SHELL_STAT: &str = "1000 (bash) S 999 1000 1000 34816 1001 4194304 5000 50000 0 0 100 50 200 100 20 0 1 0 100000 25000000 2000 18446744073709551615 0 0 0 0 0 0 65536 3670020 1266777851 0 0 0 17 2 0 0 0 0 0 0 0 0 0 0 0 0 0";

impl MockFs {
    /// Creates a typical system with a few processes.
    ///
    /// Includes: init (PID 1), a bash shell (PID 1000) and a worker
    /// (PID 1001) owned by `alice`, plus the non-pid entries `self` and `net`.
    pub fn typical_system() -> Self {
        let mut fs = Self::new();

        fs.add_file(
            "/etc/os-release",
            "\
NAME=\"Ubuntu\"
VERSION=\"22.04.3 LTS (Jammy Jellyfish)\"
ID=ubuntu
ID_LIKE=debian
PRETTY_NAME=\"Ubuntu 22.04.3 LTS\"
VERSION_ID=\"22.04\"
HOME_URL=\"https://www.ubuntu.com/\"
",
        );

        // /etc/passwd for user name resolution
        fs.add_file(
            "/etc/passwd",
            "\
root:x:0:0:root:/root:/bin/bash
daemon:x:1:1:daemon:/usr/sbin:/usr/sbin/nologin
bin:x:2:2:bin:/bin:/usr/sbin/nologin
nobody:x:65534:65534:nobody:/nonexistent:/usr/sbin/nologin
alice:x:1000:1000:Alice:/home/alice:/bin/bash
",
        );

        fs.add_file(
            "/proc/version",
            "Linux version 5.15.0-91-generic (buildd@lcy02-amd64-045) (gcc (Ubuntu 11.4.0-1ubuntu1~22.04) 11.4.0, GNU ld (GNU Binutils for Ubuntu) 2.38) #101-Ubuntu SMP Tue Nov 14 13:30:08 UTC 2023\n",
        );
        fs.add_file("/proc/uptime", "12345.67 98765.43\n");
        fs.add_file(
            "/proc/meminfo",
            "\
MemTotal:       16384000 kB
MemFree:         8192000 kB
MemAvailable:   12000000 kB
Buffers:          512000 kB
Cached:          2048000 kB
SwapCached:            0 kB
Active:          4096000 kB
Inactive:        2048000 kB
SwapTotal:       4096000 kB
SwapFree:        4096000 kB
Dirty:              1024 kB
Writeback:             0 kB
Slab:             512000 kB
SReclaimable:     256000 kB
",
        );
        fs.add_file(
            "/proc/stat",
            "\
cpu  10000 500 3000 80000 1000 200 100 0 0 0
cpu0 2500 125 750 20000 250 50 25 0 0 0
cpu1 2500 125 750 20000 250 50 25 0 0 0
cpu2 2500 125 750 20000 250 50 25 0 0 0
cpu3 2500 125 750 20000 250 50 25 0 0 0
intr 1000000 50 0 0 0 0 0 0 0 1 0 0 0 100 0 0 1000
ctxt 500000
btime 1700000000
processes 10000
procs_running 2
procs_blocked 0
",
        );

        // Entries of /proc that are not processes
        fs.add_dir("/proc/self");
        fs.add_dir("/proc/net");
        fs.add_file("/proc/net/dev", "");

        // PID 1 - init/systemd
        fs.add_process(
            1,
            INIT_STAT,
            "\
Name:\tsystemd
Umask:\t0000
State:\tS (sleeping)
Pid:\t1
PPid:\t0
Uid:\t0\t0\t0\t0
Gid:\t0\t0\t0\t0
VmPeak:\t  200000 kB
VmSize:\t  170000 kB
VmRSS:\t    12000 kB
VmData:\t   10000 kB
",
            "/sbin/init\0splash\0",
        );

        // PID 1000 - bash shell
        fs.add_process(
            1000,
            SHELL_STAT,
            "\
Name:\tbash
Pid:\t1000
PPid:\t999
Uid:\t1000\t1000\t1000\t1000
Gid:\t1000\t1000\t1000\t1000
VmPeak:\t   30000 kB
VmSize:\t   25000 kB
VmRSS:\t    8000 kB
",
            "/bin/bash\0--login\0",
        );

        // PID 1001 - worker started by the shell
        fs.add_process(
            1001,
            "1001 (worker) R 1000 1001 1000 34816 1001 4194304 800 0 0 0 250 75 0 0 20 0 4 0 200000 209715200 5000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 1 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "\
Name:\tworker
Pid:\t1001
PPid:\t1000
Uid:\t1000\t1000\t1000\t1000
Gid:\t1000\t1000\t1000\t1000
VmSize:\t  204800 kB
VmRSS:\t   51200 kB
",
            "./worker\0--threads\04\0",
        );

        fs
    }

    /// Creates a system with processes that have unusual names.
    ///
    /// Command names containing spaces and parentheses must not shift the
    /// positional fields that follow them.
    pub fn with_special_names() -> Self {
        let mut fs = Self::typical_system();

        fs.add_process(
            5000,
            "5000 (Web Content) S 4999 5000 4999 0 -1 4194304 100000 0 500 0 5000 1000 0 0 20 0 20 0 500000 2000000000 50000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "Name:\tWeb Content\nPid:\t5000\nUid:\t1000\t1000\t1000\t1000\nVmSize:\t 1953125 kB\n",
            "/usr/lib/firefox/firefox\0-contentproc\0",
        );

        fs.add_process(
            5001,
            "5001 (test(1) x) S 1 5001 5001 0 -1 4194304 1000 0 0 0 10 5 0 0 20 0 1 0 500100 10000000 1000 18446744073709551615 0 0 0 0 0 0 0 0 0 0 0 0 17 0 0 0 0 0 0 0 0 0 0 0 0 0 0",
            "Name:\ttest(1) x\nPid:\t5001\nUid:\t0\t0\t0\t0\nVmSize:\t   10240 kB\n",
            "./test(1) x\0",
        );

        fs
    }

    /// Creates a system whose records are truncated or malformed.
    ///
    /// Every reader must report absence instead of faulting.
    pub fn with_malformed_records() -> Self {
        let mut fs = Self::new();

        fs.add_file("/etc/os-release", "NAME=\"Mystery\"\n");
        fs.add_file(
            "/etc/passwd",
            "# local accounts\nbroken\nhalf:x\nalice:x:1000:1000::/home/alice:/bin/sh\n",
        );
        fs.add_file("/proc/version", "Linux\n");
        fs.add_file("/proc/uptime", "not-a-number 1.0\n");
        fs.add_file("/proc/meminfo", "MemTotal:       16384000 kB\n");
        fs.add_file("/proc/stat", "cpu  10000 500 3000\nprocesses lots\n");

        // Kernel thread: no VmSize, no cmdline content
        fs.add_process(
            2,
            "2 (kthreadd) S 0 0 0 0 -1 2129984 0 0 0 0 0 3 0 0 20 0 1 0 2 0 0",
            "Name:\tkthreadd\nPid:\t2\nUid:\t0\t0\t0\t0\n",
            "",
        );

        // Truncated stat line
        fs.add_process(
            3,
            "3 (rcu_gp) I 2 0 0 0",
            "Name:\trcu_gp\nPid:\t3\nUid:\t1000\t1000\t1000\t1000\n",
            "",
        );

        fs
    }
}
