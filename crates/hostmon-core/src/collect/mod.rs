//! One collector per metric domain. Each call reads live OS state and returns
//! a fresh record; nothing is cached between calls.

pub mod cpu;
pub mod disk;
pub mod load;
pub mod memory;
pub mod network;
pub mod process;
pub mod system;

pub use cpu::CpuInfo;
pub use disk::{DiskInfo, DiskInfoResult};
pub use load::LoadAverage;
pub use memory::MemoryInfo;
pub use network::{NetworkInfo, NetworkInfoResult};
pub use process::{ProcessInfo, ProcessInfoResult, ProcessScanPolicy, select_processes, sort_processes};
pub use system::{SystemInfo, TemperatureStat};
