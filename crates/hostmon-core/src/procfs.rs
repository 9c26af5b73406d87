//! Small readers for Linux procfs/sysfs files.
//!
//! Everything here is best-effort: unreadable or malformed files yield `None`
//! so callers can leave a field at its zero value instead of failing.

use std::path::Path;

pub(crate) fn read_trimmed(path: &Path) -> Option<String> {
    let raw = std::fs::read_to_string(path).ok()?;
    let v = raw.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

pub(crate) fn read_first_f64(path: &Path) -> Option<f64> {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.split_whitespace().next().and_then(|v| v.parse().ok()))
}

/// Value of a `Key: value ...` line, e.g. `/proc/meminfo` or `/proc/<pid>/status`.
pub(crate) fn colon_field<'a>(raw: &'a str, key: &str) -> Option<&'a str> {
    raw.lines().find_map(|line| {
        let (k, rest) = line.split_once(':')?;
        (k.trim() == key).then(|| rest.trim())
    })
}

/// First numeric token of a `Key: value` line.
pub(crate) fn colon_u64(raw: &str, key: &str) -> Option<u64> {
    colon_field(raw, key)?.split_whitespace().next()?.parse().ok()
}

/// `/proc/meminfo` entry converted from KiB to bytes.
pub(crate) fn meminfo_bytes(raw: &str, key: &str) -> Option<u64> {
    colon_u64(raw, key).map(|kib| kib.saturating_mul(1024))
}

/// Value of a `KEY=value` line in an os-release style file, with quotes stripped.
pub(crate) fn os_release_field(raw: &str, key: &str) -> Option<String> {
    raw.lines().find_map(|line| {
        let (k, v) = line.split_once('=')?;
        if k.trim() != key {
            return None;
        }
        let v = v.trim().trim_matches('"').trim_matches('\'');
        (!v.is_empty()).then(|| v.to_string())
    })
}

/// Field of the first processor block in `/proc/cpuinfo`.
pub(crate) fn cpuinfo_field<'a>(raw: &'a str, key: &str) -> Option<&'a str> {
    let first_block = raw.split("\n\n").next().unwrap_or(raw);
    colon_field(first_block, key).filter(|v| !v.is_empty())
}

/// Number of distinct `(physical id, core id)` pairs in `/proc/cpuinfo`.
pub(crate) fn cpuinfo_physical_cores(raw: &str) -> Option<usize> {
    let mut cores = std::collections::HashSet::new();
    for block in raw.split("\n\n") {
        let package = colon_field(block, "physical id").unwrap_or("0");
        if let Some(core) = colon_field(block, "core id") {
            cores.insert((package.to_string(), core.to_string()));
        }
    }
    (!cores.is_empty()).then_some(cores.len())
}

/// `/proc` lists one numeric directory per process; threads stay under `task/`.
pub(crate) fn is_pid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
}

/// Number of processes (not threads) listed under `proc_root`.
pub(crate) fn count_pids(proc_root: &Path) -> Option<u64> {
    let entries = std::fs::read_dir(proc_root).ok()?;
    let count = entries
        .filter_map(Result::ok)
        .filter(|e| is_pid_name(&e.file_name().to_string_lossy()))
        .count();
    Some(count as u64)
}

/// Per-interface `(drops_in, drops_out)` from `/proc/net/dev`.
pub(crate) fn net_dev_drops(raw: &str, iface: &str) -> Option<(u64, u64)> {
    for line in raw.lines().skip(2) {
        let Some((name, stats)) = line.split_once(':') else {
            continue;
        };
        if name.trim() != iface {
            continue;
        }
        let fields: Vec<u64> = stats
            .split_whitespace()
            .filter_map(|s| s.parse::<u64>().ok())
            .collect();
        if fields.len() < 16 {
            return None;
        }
        return Some((fields[3], fields[11]));
    }
    None
}
