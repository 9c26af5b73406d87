//! RAM and swap usage.

use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::error::CollectError;
use crate::procfs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryInfo {
    pub total_bytes: u64,
    pub available_bytes: u64,
    pub used_bytes: u64,
    pub used_percent: f64,
    pub free_bytes: u64,
    pub buffers_bytes: u64,
    pub cached_bytes: u64,
    pub swap_total_bytes: u64,
    pub swap_used_bytes: u64,
    pub swap_free_bytes: u64,
}

pub fn collect() -> Result<MemoryInfo, CollectError> {
    let mut sys = System::new();
    sys.refresh_memory();

    let total = sys.total_memory();
    if total == 0 {
        return Err(CollectError::VirtualMemory(
            "total memory reported as zero".to_string(),
        ));
    }
    let swap_total = sys.total_swap();
    let swap_used = sys.used_swap();
    if swap_used > swap_total {
        return Err(CollectError::SwapMemory(format!(
            "used swap {swap_used} exceeds total {swap_total}"
        )));
    }

    // sysinfo does not split page cache from buffers.
    let meminfo = std::fs::read_to_string("/proc/meminfo").unwrap_or_default();
    let used = sys.used_memory();

    Ok(MemoryInfo {
        total_bytes: total,
        available_bytes: sys.available_memory(),
        used_bytes: used,
        used_percent: used_percent(used, total),
        free_bytes: sys.free_memory(),
        buffers_bytes: procfs::meminfo_bytes(&meminfo, "Buffers").unwrap_or(0),
        cached_bytes: procfs::meminfo_bytes(&meminfo, "Cached").unwrap_or(0),
        swap_total_bytes: swap_total,
        swap_used_bytes: swap_used,
        swap_free_bytes: sys.free_swap(),
    })
}

fn used_percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_handles_zero_total() {
        assert_eq!(used_percent(5, 0), 0.0);
        assert!((used_percent(1, 4) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn live_memory_is_consistent() {
        let info = collect().unwrap();
        assert!(info.total_bytes > 0);
        assert!(info.used_bytes <= info.total_bytes);
        assert!((0.0..=100.0).contains(&info.used_percent));
        assert!(info.swap_used_bytes <= info.swap_total_bytes);
    }
}
