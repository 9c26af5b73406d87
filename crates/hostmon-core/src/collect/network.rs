//! Per-interface network counters since boot.

use serde::{Deserialize, Serialize};
use sysinfo::Networks;

use crate::args::NetworkInfoParams;
use crate::error::CollectError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfo {
    pub interface: String,
    pub bytes_sent: u64,
    pub bytes_recv: u64,
    pub packets_sent: u64,
    pub packets_recv: u64,
    pub errors_in: u64,
    pub errors_out: u64,
    pub drops_in: u64,
    pub drops_out: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkInfoResult {
    pub interfaces: Vec<NetworkInfo>,
}

pub fn collect(params: &NetworkInfoParams) -> Result<NetworkInfoResult, CollectError> {
    let networks = Networks::new_with_refreshed_list();
    // Drop counters are not exposed by sysinfo.
    let net_dev = if cfg!(target_os = "linux") {
        Some(
            std::fs::read_to_string("/proc/net/dev")
                .map_err(|e| CollectError::NetworkStats(e.to_string()))?,
        )
    } else {
        None
    };

    let mut interfaces: Vec<NetworkInfo> = networks
        .iter()
        .filter(|(name, _)| params.matches(name))
        .map(|(name, data)| {
            let (drops_in, drops_out) = net_dev
                .as_deref()
                .and_then(|raw| crate::procfs::net_dev_drops(raw, name))
                .unwrap_or((0, 0));
            NetworkInfo {
                interface: name.clone(),
                bytes_sent: data.total_transmitted(),
                bytes_recv: data.total_received(),
                packets_sent: data.total_packets_transmitted(),
                packets_recv: data.total_packets_received(),
                errors_in: data.total_errors_on_received(),
                errors_out: data.total_errors_on_transmitted(),
                drops_in,
                drops_out,
            }
        })
        .collect();
    interfaces.sort_by(|a, b| a.interface.cmp(&b.interface));

    Ok(NetworkInfoResult { interfaces })
}
