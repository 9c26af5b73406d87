//! Host identity, uptime and sensor temperatures.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sysinfo::System;

use crate::error::CollectError;
use crate::procfs;

/// One temperature sensor reading in degrees Celsius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemperatureStat {
    pub sensor_key: String,
    pub temperature: f64,
}

/// Snapshot of host identity and uptime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub hostname: String,
    pub os: String,
    pub platform: String,
    pub platform_family: String,
    pub platform_version: String,
    pub kernel_version: String,
    pub kernel_arch: String,
    pub uptime_seconds: u64,
    pub boot_time: u64,
    pub processes: u64,
    pub host_id: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub virtualization_system: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub virtualization_role: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub temperature: Vec<TemperatureStat>,
}

pub fn collect() -> Result<SystemInfo, CollectError> {
    let hostname = System::host_name()
        .ok_or_else(|| CollectError::HostInfo("hostname unavailable".to_string()))?;
    let (platform, platform_family, platform_version) = platform_triple();
    let (virtualization_system, virtualization_role) = virtualization();

    Ok(SystemInfo {
        hostname,
        os: std::env::consts::OS.to_string(),
        platform,
        platform_family,
        platform_version,
        kernel_version: System::kernel_version().unwrap_or_default(),
        kernel_arch: std::env::consts::ARCH.to_string(),
        uptime_seconds: System::uptime(),
        boot_time: System::boot_time(),
        processes: process_count(),
        host_id: host_id(),
        virtualization_system,
        virtualization_role,
        temperature: temperatures(),
    })
}

/// `(platform, family, version)`, e.g. `("ubuntu", "debian", "22.04")`.
fn platform_triple() -> (String, String, String) {
    #[cfg(target_os = "linux")]
    {
        if let Ok(raw) = std::fs::read_to_string("/etc/os-release") {
            let id = procfs::os_release_field(&raw, "ID").unwrap_or_default();
            let family = procfs::os_release_field(&raw, "ID_LIKE")
                .and_then(|like| like.split_whitespace().next().map(str::to_string))
                .unwrap_or_else(|| id.clone());
            let version = procfs::os_release_field(&raw, "VERSION_ID").unwrap_or_default();
            return (id, family, version);
        }
    }
    let name = System::distribution_id();
    let version = System::os_version().unwrap_or_default();
    (name.clone(), name, version)
}

/// Processes, excluding their threads.
fn process_count() -> u64 {
    #[cfg(target_os = "linux")]
    {
        if let Some(count) = procfs::count_pids(Path::new("/proc")) {
            return count;
        }
    }
    let mut sys = System::new();
    sys.refresh_processes(sysinfo::ProcessesToUpdate::All, true);
    sys.processes()
        .values()
        .filter(|p| p.thread_kind().is_none())
        .count() as u64
}

fn host_id() -> String {
    [
        "/sys/class/dmi/id/product_uuid",
        "/etc/machine-id",
        "/var/lib/dbus/machine-id",
    ]
    .iter()
    .find_map(|p| procfs::read_trimmed(Path::new(p)))
    .map(|id| id.to_lowercase())
    .unwrap_or_default()
}

/// Best-effort `(system, role)`; both empty when running on bare metal or unknown.
fn virtualization() -> (String, String) {
    if Path::new("/.dockerenv").exists() {
        return ("docker".to_string(), "guest".to_string());
    }
    if let Some(cgroup) = procfs::read_trimmed(Path::new("/proc/1/cgroup")) {
        if cgroup.contains("docker") {
            return ("docker".to_string(), "guest".to_string());
        }
        if cgroup.contains("lxc") {
            return ("lxc".to_string(), "guest".to_string());
        }
    }
    let hypervisor_flag = std::fs::read_to_string("/proc/cpuinfo")
        .ok()
        .and_then(|raw| procfs::cpuinfo_field(&raw, "flags").map(str::to_string))
        .is_some_and(|flags| flags.split_whitespace().any(|f| f == "hypervisor"));
    if !hypervisor_flag {
        return (String::new(), String::new());
    }
    let vendor = procfs::read_trimmed(Path::new("/sys/class/dmi/id/sys_vendor"))
        .unwrap_or_default()
        .to_lowercase();
    let system = if vendor.contains("qemu") || vendor.contains("kvm") {
        "kvm"
    } else if vendor.contains("vmware") {
        "vmware"
    } else if vendor.contains("xen") {
        "xen"
    } else if vendor.contains("microsoft") {
        "hyperv"
    } else if vendor.contains("innotek") || vendor.contains("virtualbox") {
        "vbox"
    } else {
        "unknown"
    };
    (system.to_string(), "guest".to_string())
}

/// Readings from `/sys/class/hwmon/*/temp*_input` (millidegrees).
fn temperatures() -> Vec<TemperatureStat> {
    let mut out = Vec::new();
    let Ok(hwmons) = std::fs::read_dir("/sys/class/hwmon") else {
        return out;
    };
    let mut dirs: Vec<_> = hwmons.flatten().map(|e| e.path()).collect();
    dirs.sort();
    for dir in dirs {
        let chip = procfs::read_trimmed(&dir.join("name")).unwrap_or_else(|| "hwmon".to_string());
        let Ok(entries) = std::fs::read_dir(&dir) else {
            continue;
        };
        let mut inputs: Vec<String> = entries
            .flatten()
            .filter_map(|e| e.file_name().into_string().ok())
            .filter(|n| n.starts_with("temp") && n.ends_with("_input"))
            .collect();
        inputs.sort();
        for input in inputs {
            let Some(milli) = procfs::read_first_f64(&dir.join(&input)) else {
                continue;
            };
            let base = input.trim_end_matches("_input");
            let label = procfs::read_trimmed(&dir.join(format!("{base}_label")))
                .unwrap_or_else(|| base.to_string());
            out.push(TemperatureStat {
                sensor_key: format!("{chip}_{}", label.replace(' ', "_").to_lowercase()),
                temperature: milli / 1000.0,
            });
        }
    }
    out
}
