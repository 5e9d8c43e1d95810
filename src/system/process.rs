//! Process resource introspection.
//!
//! Reads `/proc/self` on Linux. Other platforms report zeros so the info
//! endpoints keep a stable shape everywhere.

use serde::Serialize;

/// Kernel clock ticks per second assumed for `/proc/<pid>/stat` times.
const CLOCK_TICKS_PER_SEC: u64 = 100;

/// Resident and virtual memory of this process, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MemoryUsage {
    pub rss: u64,
    #[serde(rename = "virtual")]
    pub virtual_size: u64,
}

/// CPU time consumed by this process, in microseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CpuUsage {
    pub user: u64,
    pub system: u64,
}

/// Point-in-time process resource snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ProcessSnapshot {
    pub memory: MemoryUsage,
    pub cpu: CpuUsage,
}

impl ProcessSnapshot {
    pub fn capture() -> Self {
        Self {
            memory: memory_usage(),
            cpu: cpu_usage(),
        }
    }
}

/// Current memory usage of this process.
pub fn memory_usage() -> MemoryUsage {
    std::fs::read_to_string("/proc/self/status")
        .map(|status| parse_status(&status))
        .unwrap_or_default()
}

/// CPU time consumed so far by this process.
pub fn cpu_usage() -> CpuUsage {
    std::fs::read_to_string("/proc/self/stat")
        .ok()
        .and_then(|stat| parse_stat(&stat))
        .unwrap_or_default()
}

pub fn platform() -> &'static str {
    std::env::consts::OS
}

pub fn arch() -> &'static str {
    std::env::consts::ARCH
}

/// Minimum Rust toolchain the binary was built for.
pub fn runtime_version() -> String {
    format!("rust {}", env!("CARGO_PKG_RUST_VERSION"))
}

fn parse_status(status: &str) -> MemoryUsage {
    let mut usage = MemoryUsage::default();
    for line in status.lines() {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            usage.rss = parse_kb(rest);
        } else if let Some(rest) = line.strip_prefix("VmSize:") {
            usage.virtual_size = parse_kb(rest);
        }
    }
    usage
}

fn parse_kb(field: &str) -> u64 {
    field
        .split_whitespace()
        .next()
        .and_then(|n| n.parse::<u64>().ok())
        .map(|kb| kb * 1024)
        .unwrap_or(0)
}

fn parse_stat(stat: &str) -> Option<CpuUsage> {
    // The command name (field 2) is parenthesised and may contain spaces.
    let after_comm = &stat[stat.rfind(')')? + 1..];
    let fields: Vec<&str> = after_comm.split_whitespace().collect();
    // utime and stime are fields 14 and 15; field 3 is the first after ')'.
    let utime: u64 = fields.get(11)?.parse().ok()?;
    let stime: u64 = fields.get(12)?.parse().ok()?;
    let micros = |ticks: u64| ticks * 1_000_000 / CLOCK_TICKS_PER_SEC;
    Some(CpuUsage {
        user: micros(utime),
        system: micros(stime),
    })
}
