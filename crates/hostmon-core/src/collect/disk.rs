//! Filesystem usage per mounted partition.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sysinfo::Disks;

use crate::args::DiskInfoParams;
use crate::error::CollectError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskInfo {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub total_bytes: u64,
    pub free_bytes: u64,
    pub used_bytes: u64,
    pub used_percent: f64,
    pub inodes_total: u64,
    pub inodes_used: u64,
    pub inodes_free: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskInfoResult {
    pub disks: Vec<DiskInfo>,
}

/// Block and inode usage for the filesystem holding a path.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct FsUsage {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    pub used_percent: f64,
    pub inodes_total: u64,
    pub inodes_used: u64,
    pub inodes_free: u64,
}

impl FsUsage {
    /// Build from raw statvfs counters. `free` counts only blocks available to
    /// unprivileged users, so `used + free` can be less than `total`.
    fn from_counters(frsize: u64, blocks: u64, bfree: u64, bavail: u64, files: u64, ffree: u64) -> Self {
        let total = blocks.saturating_mul(frsize);
        let free = bavail.saturating_mul(frsize);
        let used = blocks.saturating_sub(bfree).saturating_mul(frsize);
        let used_percent = if used + free == 0 {
            0.0
        } else {
            used as f64 / (used + free) as f64 * 100.0
        };
        Self {
            total,
            free,
            used,
            used_percent,
            inodes_total: files,
            inodes_used: files.saturating_sub(ffree),
            inodes_free: ffree,
        }
    }
}

#[cfg(unix)]
#[allow(clippy::unnecessary_cast)]
pub(crate) fn usage(path: &str) -> std::io::Result<FsUsage> {
    let c_path = std::ffi::CString::new(path)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let mut st = std::mem::MaybeUninit::<libc::statvfs>::uninit();
    // SAFETY: c_path is NUL-terminated and st points to writable storage
    // sized for one statvfs struct.
    let rc = unsafe { libc::statvfs(c_path.as_ptr(), st.as_mut_ptr()) };
    if rc != 0 {
        return Err(std::io::Error::last_os_error());
    }
    // SAFETY: statvfs returned 0, so it fully initialized the struct.
    let st = unsafe { st.assume_init() };
    Ok(FsUsage::from_counters(
        st.f_frsize as u64,
        st.f_blocks as u64,
        st.f_bfree as u64,
        st.f_bavail as u64,
        st.f_files as u64,
        st.f_ffree as u64,
    ))
}

#[cfg(not(unix))]
pub(crate) fn usage(path: &str) -> std::io::Result<FsUsage> {
    let disks = Disks::new_with_refreshed_list();
    let disk = disks
        .list()
        .iter()
        .find(|d| d.mount_point() == Path::new(path))
        .ok_or_else(|| std::io::Error::from(std::io::ErrorKind::NotFound))?;
    let total = disk.total_space();
    let free = disk.available_space();
    let used = total.saturating_sub(free);
    Ok(FsUsage {
        total,
        free,
        used,
        used_percent: if total == 0 { 0.0 } else { used as f64 / total as f64 * 100.0 },
        ..FsUsage::default()
    })
}

/// A mounted partition as reported by the OS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Partition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
}

fn partitions() -> Result<Vec<Partition>, CollectError> {
    let disks = Disks::new_with_refreshed_list();
    let list: Vec<Partition> = disks
        .list()
        .iter()
        .map(|d| Partition {
            device: d.name().to_string_lossy().into_owned(),
            mountpoint: d.mount_point().to_string_lossy().into_owned(),
            fstype: d.file_system().to_string_lossy().into_owned(),
        })
        .collect();
    if !list.is_empty() || !cfg!(target_os = "linux") {
        return Ok(list);
    }
    // sysinfo drops overlay and other virtual roots; containers often have nothing else.
    let raw = std::fs::read_to_string("/proc/mounts")
        .map_err(|e| CollectError::DiskPartitions(e.to_string()))?;
    Ok(parse_mounts(&raw))
}

/// Entries of `/proc/mounts` backed by a device or an overlay root.
fn parse_mounts(raw: &str) -> Vec<Partition> {
    raw.lines()
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let device = fields.next()?;
            let mountpoint = fields.next()?;
            let fstype = fields.next()?;
            (device.starts_with('/') || fstype == "overlay").then(|| Partition {
                device: device.to_string(),
                mountpoint: mountpoint.replace("\\040", " "),
                fstype: fstype.to_string(),
            })
        })
        .collect()
}

/// Filesystem type of the mount with the longest prefix covering `path`.
fn fstype_for(path: &str, parts: &[Partition]) -> String {
    let target = Path::new(path);
    parts
        .iter()
        .filter(|p| target.starts_with(&p.mountpoint))
        .max_by_key(|p| p.mountpoint.len())
        .map(|p| p.fstype.clone())
        .unwrap_or_default()
}

fn record(device: String, mountpoint: String, fstype: String, u: FsUsage) -> DiskInfo {
    DiskInfo {
        device,
        mountpoint,
        fstype,
        total_bytes: u.total,
        free_bytes: u.free,
        used_bytes: u.used,
        used_percent: u.used_percent,
        inodes_total: u.inodes_total,
        inodes_used: u.inodes_used,
        inodes_free: u.inodes_free,
    }
}

pub fn collect(params: &DiskInfoParams) -> Result<DiskInfoResult, CollectError> {
    if !params.path.is_empty() {
        let u = usage(&params.path).map_err(|source| CollectError::DiskUsage {
            path: params.path.clone(),
            source,
        })?;
        let fstype = partitions()
            .map(|parts| fstype_for(&params.path, &parts))
            .unwrap_or_default();
        return Ok(DiskInfoResult {
            disks: vec![record("N/A".to_string(), params.path.clone(), fstype, u)],
        });
    }

    let mut disks = Vec::new();
    for part in partitions()? {
        match usage(&part.mountpoint) {
            Ok(u) => disks.push(record(part.device, part.mountpoint, part.fstype, u)),
            Err(e) => log::debug!("skipping {}: {e}", part.mountpoint),
        }
    }
    Ok(DiskInfoResult { disks })
}
