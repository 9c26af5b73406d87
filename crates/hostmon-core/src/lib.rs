//! # hostmon-core
//!
//! Host telemetry behind a fixed set of named operations.
//!
//! ```no_run
//! use hostmon_core::{ArgumentBag, Dispatcher, Envelope};
//!
//! let dispatcher = Dispatcher::default();
//! let mut args = ArgumentBag::new();
//! args.insert("limit".into(), 5.into());
//! args.insert("sort_by".into(), "memory".into());
//!
//! match dispatcher.dispatch("get_process_info", &args) {
//!     Envelope::Success { status, payload } => println!("{status}: {payload}"),
//!     Envelope::Failure { kind, message } => eprintln!("{kind}: {message}"),
//! }
//! ```
//!
//! ## Architecture
//!
//! Argument bag → [`args`] (normalize, clamp) → [`Registry`] lookup →
//! [`HostProbe`] collector → [`Envelope`]
//!
//! Normalization never fails. Unknown operations and collector errors come
//! back as [`Envelope::Failure`] with an [`ErrorKind`]; nothing a client sends
//! can panic the dispatcher.

pub mod args;
pub mod collect;
pub mod dispatch;
pub mod error;
pub mod probe;
mod procfs;
pub mod registry;

pub use args::{
    ArgumentBag, CpuInfoParams, DiskInfoParams, NetworkInfoParams, ProcessInfoParams, SortKey,
};
pub use collect::{
    CpuInfo, DiskInfo, DiskInfoResult, LoadAverage, MemoryInfo, NetworkInfo, NetworkInfoResult,
    ProcessInfo, ProcessInfoResult, ProcessScanPolicy, SystemInfo, TemperatureStat,
};
pub use dispatch::{Dispatcher, Envelope};
pub use error::{CollectError, DispatchError, ErrorKind};
pub use probe::{HostProbe, LiveHost};
pub use registry::{Operation, ParamSpec, ParamType, Registry};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name reported in protocol handshakes and `--version` output.
pub const SERVER_NAME: &str = "hostmon";
