//! Host probe trait and the live implementation.
//!
//! Every collector is reached through [`HostProbe`], so the registry and
//! dispatcher can be exercised against a scripted host in tests.

use crate::args::{CpuInfoParams, DiskInfoParams, NetworkInfoParams, ProcessInfoParams};
use crate::collect::{
    self, CpuInfo, DiskInfoResult, LoadAverage, MemoryInfo, NetworkInfoResult, ProcessInfoResult,
    ProcessScanPolicy, SystemInfo,
};
use crate::error::CollectError;

/// Source of telemetry records. One method per operation.
///
/// Implementations may block: CPU sampling sleeps for the requested window.
pub trait HostProbe: Send + Sync {
    fn system_info(&self) -> Result<SystemInfo, CollectError>;

    fn cpu_info(&self, params: &CpuInfoParams) -> Result<CpuInfo, CollectError>;

    fn memory_info(&self) -> Result<MemoryInfo, CollectError>;

    fn disk_info(&self, params: &DiskInfoParams) -> Result<DiskInfoResult, CollectError>;

    fn network_info(&self, params: &NetworkInfoParams) -> Result<NetworkInfoResult, CollectError>;

    fn process_info(&self, params: &ProcessInfoParams) -> Result<ProcessInfoResult, CollectError>;

    fn load_average(&self) -> Result<LoadAverage, CollectError>;
}

/// Reads the machine this process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiveHost {
    pub scan_policy: ProcessScanPolicy,
}

impl LiveHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scan_policy(scan_policy: ProcessScanPolicy) -> Self {
        Self { scan_policy }
    }
}

impl HostProbe for LiveHost {
    fn system_info(&self) -> Result<SystemInfo, CollectError> {
        collect::system::collect()
    }

    fn cpu_info(&self, params: &CpuInfoParams) -> Result<CpuInfo, CollectError> {
        collect::cpu::collect(params)
    }

    fn memory_info(&self) -> Result<MemoryInfo, CollectError> {
        collect::memory::collect()
    }

    fn disk_info(&self, params: &DiskInfoParams) -> Result<DiskInfoResult, CollectError> {
        collect::disk::collect(params)
    }

    fn network_info(&self, params: &NetworkInfoParams) -> Result<NetworkInfoResult, CollectError> {
        collect::network::collect(params)
    }

    fn process_info(&self, params: &ProcessInfoParams) -> Result<ProcessInfoResult, CollectError> {
        collect::process::collect(params, self.scan_policy)
    }

    fn load_average(&self) -> Result<LoadAverage, CollectError> {
        collect::load::collect()
    }
}
