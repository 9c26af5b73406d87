//! CPU usage sampling and static CPU description.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::args::CpuInfoParams;
use crate::error::CollectError;
use crate::procfs;

/// CPU usage over one sampling window plus the processor description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuInfo {
    /// One entry when aggregated, one per logical core otherwise.
    pub usage_percent: Vec<f64>,
    pub logical_count: usize,
    pub physical_count: usize,
    pub model_name: String,
    pub family: String,
    pub speed_mhz: f64,
    /// Cache size in KB as reported by the kernel.
    pub cache_size: i32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<String>,
}

/// Sample CPU usage across `params.interval_ms`. Blocks the calling thread.
///
/// The window is never shorter than `sysinfo::MINIMUM_CPU_UPDATE_INTERVAL`
/// (200ms on most platforms), so `interval_ms: 100` still sleeps for that
/// minimum.
pub fn collect(params: &CpuInfoParams) -> Result<CpuInfo, CollectError> {
    let mut sys = System::new();
    sys.refresh_cpu_all();
    if sys.cpus().is_empty() {
        return Err(CollectError::CpuUsage("no CPUs reported".to_string()));
    }

    // sysinfo needs at least MINIMUM_CPU_UPDATE_INTERVAL between refreshes.
    let window = Duration::from_millis(params.interval_ms).max(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    std::thread::sleep(window);
    sys.refresh_cpu_all();

    let usage_percent = if params.per_cpu {
        sys.cpus().iter().map(|c| f64::from(c.cpu_usage())).collect()
    } else {
        vec![f64::from(sys.global_cpu_usage())]
    };

    let cpuinfo = std::fs::read_to_string("/proc/cpuinfo").unwrap_or_default();
    let first = sys
        .cpus()
        .first()
        .ok_or_else(|| CollectError::CpuInfo("no CPUs reported".to_string()))?;

    let model_name = match first.brand().trim() {
        "" => procfs::cpuinfo_field(&cpuinfo, "model name")
            .unwrap_or_default()
            .to_string(),
        brand => brand.to_string(),
    };
    let speed_mhz = match first.frequency() {
        0 => procfs::cpuinfo_field(&cpuinfo, "cpu MHz")
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(0.0),
        mhz => mhz as f64,
    };
    let logical_count = sys.cpus().len();
    let physical_count = sys
        .physical_core_count()
        .or_else(|| procfs::cpuinfo_physical_cores(&cpuinfo))
        .unwrap_or(logical_count);

    Ok(CpuInfo {
        usage_percent,
        logical_count,
        physical_count,
        model_name,
        family: procfs::cpuinfo_field(&cpuinfo, "cpu family")
            .unwrap_or_default()
            .to_string(),
        speed_mhz,
        cache_size: cache_size_kb(&cpuinfo),
        flags: cpu_flags(&cpuinfo),
    })
}

/// `cache size : 8192 KB` from `/proc/cpuinfo`, falling back to the L2 size in sysfs.
fn cache_size_kb(cpuinfo: &str) -> i32 {
    let parse_kb = |raw: &str| -> Option<i32> {
        let digits: String = raw.chars().take_while(|c| c.is_ascii_digit()).collect();
        let value: i32 = digits.parse().ok()?;
        Some(if raw.trim_end().ends_with('M') { value.saturating_mul(1024) } else { value })
    };
    procfs::cpuinfo_field(cpuinfo, "cache size")
        .and_then(parse_kb)
        .or_else(|| {
            procfs::read_trimmed(Path::new("/sys/devices/system/cpu/cpu0/cache/index2/size"))
                .and_then(|s| parse_kb(&s))
        })
        .unwrap_or(0)
}

/// x86 `flags` or ARM `Features` line.
fn cpu_flags(cpuinfo: &str) -> Vec<String> {
    procfs::cpuinfo_field(cpuinfo, "flags")
        .or_else(|| procfs::cpuinfo_field(cpuinfo, "Features"))
        .map(|line| line.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}
