//! procfacts - print system and process facts read from `/proc`.
//!
//! Takes one sample by default. With an interval it keeps sampling until
//! `--count` samples were printed or Ctrl-C is pressed; CPU percentages from
//! the second sample on are computed from the difference between samples.
//!
//! Usage:
//!   procfacts                  # one sample
//!   procfacts 2                # sample every 2 seconds
//!   procfacts 1 -n 5 --json    # five JSON samples, one second apart
//!   procfacts --pid 1 --pid 42 # only these processes

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use clap::Parser;
use serde::Serialize;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

use procfacts::collector::procfs::CpuTimes;
use procfacts::collector::{LinuxParser, ParserConfig, RealFs};
use procfacts::util::ticks_per_second;

/// Print system and process facts read from the proc filesystem.
#[derive(Parser)]
#[command(name = "procfacts", about = "System and process facts from /proc", version)]
struct Args {
    /// Sampling interval in seconds. Without it a single sample is printed.
    #[arg(value_name = "INTERVAL")]
    interval: Option<u64>,

    /// Number of samples to print (default: 1 without INTERVAL, unlimited with it).
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Only report these processes. May be repeated.
    #[arg(short, long = "pid", value_name = "PID")]
    pids: Vec<u32>,

    /// Print samples as JSON, one object per line.
    #[arg(long)]
    json: bool,

    /// Path to /proc filesystem (for testing/mocking).
    #[arg(long, default_value = "/proc")]
    proc_path: PathBuf,

    /// Path to the os-release file.
    #[arg(long, default_value = "/etc/os-release")]
    os_release: PathBuf,

    /// Path to the account database.
    #[arg(long, default_value = "/etc/passwd")]
    passwd: PathBuf,

    /// Clock ticks per second. Defaults to the value reported by the system.
    #[arg(long, value_name = "HZ")]
    clk_tck: Option<u64>,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is warn level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("procfacts={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Serialize)]
struct SystemRow {
    operating_system: String,
    kernel: String,
    uptime: u64,
    total_processes: u64,
    running_processes: u64,
    memory_utilization: f64,
    memory_used_ratio: f64,
    /// `None` on the first sample.
    cpu_utilization: Option<f64>,
    jiffies: u64,
}

#[derive(Serialize)]
struct ProcessRow {
    pid: u32,
    user: String,
    /// Fraction of one core, averaged since the previous sample.
    cpu_utilization: f64,
    ram_mb: String,
    /// Seconds since the process started.
    age: u64,
    command: String,
}

#[derive(Serialize)]
struct Sample {
    system: SystemRow,
    processes: Vec<ProcessRow>,
}

/// Counters kept from the previous sample to compute rates.
#[derive(Default)]
struct Previous {
    cpu: Option<CpuTimes>,
    taken_at: Option<Instant>,
    process_jiffies: HashMap<u32, u64>,
}

fn take_sample(linux: &LinuxParser<RealFs>, only: &[u32], previous: &mut Previous) -> Sample {
    let now = Instant::now();
    let ticks = linux.config().ticks_per_second.max(1) as f64;
    let uptime = linux.uptime();

    let cpu_now = linux.system().cpu_times().ok();
    let cpu_utilization = match (&cpu_now, &previous.cpu) {
        (Some(now), Some(before)) => now.utilization_since(before),
        _ => None,
    };

    let system = SystemRow {
        operating_system: linux.operating_system(),
        kernel: linux.kernel(),
        uptime,
        total_processes: linux.total_processes(),
        running_processes: linux.running_processes(),
        memory_utilization: linux.memory_utilization(),
        memory_used_ratio: linux.memory_used_ratio(),
        cpu_utilization,
        jiffies: linux.jiffies(),
    };

    let pids = if only.is_empty() {
        let mut pids = linux.pids();
        pids.sort_unstable();
        pids
    } else {
        only.to_vec()
    };

    let elapsed = previous.taken_at.map(|t| now.duration_since(t).as_secs_f64());
    let mut process_jiffies = HashMap::with_capacity(pids.len());
    let mut processes = Vec::with_capacity(pids.len());

    for pid in pids {
        let active = linux.active_jiffies_for(pid);
        let started = linux.uptime_for(pid);
        let age = uptime.saturating_sub(started);

        // Rate since the last sample when possible, lifetime average otherwise.
        let cpu_utilization = match (previous.process_jiffies.get(&pid), elapsed) {
            (Some(&before), Some(secs)) if secs > 0.0 => {
                active.saturating_sub(before) as f64 / ticks / secs
            }
            _ if age > 0 => active as f64 / ticks / age as f64,
            _ => 0.0,
        };

        process_jiffies.insert(pid, active);
        processes.push(ProcessRow {
            pid,
            user: linux.user(pid),
            cpu_utilization,
            ram_mb: linux.ram(pid),
            age,
            command: linux.command(pid).replace('\0', " ").trim_end().to_string(),
        });
    }

    previous.cpu = cpu_now;
    previous.taken_at = Some(now);
    previous.process_jiffies = process_jiffies;

    Sample { system, processes }
}

fn print_text(sample: &Sample) {
    let system = &sample.system;
    println!("OS: {}", system.operating_system);
    println!("Kernel: {}", system.kernel);
    match system.cpu_utilization {
        Some(cpu) => println!("CPU: {:.1}%", cpu * 100.0),
        None => println!("CPU: -"),
    }
    println!(
        "Memory: {:.1}% occupied, {:.1}% used",
        system.memory_utilization * 100.0,
        system.memory_used_ratio * 100.0
    );
    println!(
        "Processes: {} total, {} running",
        system.total_processes, system.running_processes
    );
    println!("Up time: {}", format_duration(system.uptime));
    println!();
    println!(
        "{:>7} {:<12} {:>6} {:>10} {:>10}  COMMAND",
        "PID", "USER", "CPU%", "RAM[MB]", "AGE"
    );
    for row in &sample.processes {
        println!(
            "{:>7} {:<12} {:>6.1} {:>10} {:>10}  {}",
            row.pid,
            truncate(&row.user, 12),
            row.cpu_utilization * 100.0,
            row.ram_mb,
            format_duration(row.age),
            row.command
        );
    }
}

/// Formats seconds as `HH:MM:SS`, with a day prefix past 24 hours.
fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, secs)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Rejects argument values that would make the sampler spin or divide by zero.
fn validate(args: &Args) -> Result<(), &'static str> {
    if args.count == Some(0) {
        return Err("--count must be at least 1");
    }
    if args.interval == Some(0) {
        return Err("INTERVAL must be at least 1 second");
    }
    if args.clk_tck == Some(0) {
        return Err("--clk-tck must be positive");
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    if let Err(msg) = validate(&args) {
        eprintln!("Error: {}", msg);
        std::process::exit(1);
    }

    let config = ParserConfig::default()
        .with_proc_root(&args.proc_path)
        .with_os_release_path(&args.os_release)
        .with_passwd_path(&args.passwd)
        .with_ticks_per_second(args.clk_tck.unwrap_or_else(ticks_per_second));
    info!(
        "Config: proc={}, os_release={}, passwd={}, clk_tck={}",
        config.proc_root.display(),
        config.os_release_path.display(),
        config.passwd_path.display(),
        config.ticks_per_second
    );

    let linux = LinuxParser::new(RealFs::new(), config);

    let limit = match (args.interval, args.count) {
        (_, Some(count)) => Some(count),
        (None, None) => Some(1),
        (Some(_), None) => None,
    };
    let interval = Duration::from_secs(args.interval.unwrap_or(1));

    // Setup graceful shutdown
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    }) {
        warn!("Failed to set Ctrl-C handler: {}", e);
    }

    let mut previous = Previous::default();
    let mut printed: u64 = 0;

    while running.load(Ordering::SeqCst) {
        let sample = take_sample(&linux, &args.pids, &mut previous);
        debug!("Sampled {} processes", sample.processes.len());

        if args.json {
            match serde_json::to_string(&sample) {
                Ok(line) => println!("{}", line),
                Err(e) => warn!("Failed to encode sample: {}", e),
            }
        } else {
            if printed > 0 {
                println!();
            }
            print_text(&sample);
        }

        printed += 1;
        if limit.is_some_and(|limit| printed >= limit) {
            break;
        }

        // Sleep in short steps so Ctrl-C is noticed promptly
        let deadline = Instant::now() + interval;
        while running.load(Ordering::SeqCst) && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(100).min(interval));
        }
    }
}
