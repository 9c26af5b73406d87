//! Process table snapshot with filtering, sorting and a bounded scan.
//!
//! A listing does not inspect every process on the host. Candidates are
//! visited in ascending pid order and the scan stops once
//! `limit * scan_factor` of them pass the name filter; only that gathered set
//! is sorted and truncated. On hosts with thousands of processes this keeps
//! the call cheap at the cost of possibly missing a "hotter" process that was
//! never reached.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sysinfo::{Pid, Process, ProcessRefreshKind, ProcessesToUpdate, System, Users};

use crate::args::{ProcessInfoParams, SortKey};
use crate::error::CollectError;
use crate::procfs;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfo {
    pub pid: u32,
    pub name: String,
    pub status: String,
    pub cpu_percent: f64,
    pub memory_rss_bytes: u64,
    pub memory_vms_bytes: u64,
    pub memory_percent: f64,
    /// Start time in milliseconds since the Unix epoch.
    pub create_time: u64,
    pub num_threads: u32,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cmdline: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessInfoResult {
    pub processes: Vec<ProcessInfo>,
    /// Always `processes.len()`.
    pub count: usize,
}

/// How many candidates a listing gathers before it sorts and truncates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessScanPolicy {
    /// Multiplier applied to the requested limit. Values below 1 act as 1.
    pub scan_factor: usize,
}

impl Default for ProcessScanPolicy {
    fn default() -> Self {
        Self { scan_factor: 2 }
    }
}

impl ProcessScanPolicy {
    /// Maximum number of candidates gathered for a given limit.
    pub fn budget(&self, limit: usize) -> usize {
        limit.saturating_mul(self.scan_factor.max(1))
    }
}

/// Stable in-place sort; ties keep their enumeration order.
pub fn sort_processes(list: &mut [ProcessInfo], key: SortKey) {
    match key {
        SortKey::Cpu => list.sort_by(|a, b| b.cpu_percent.total_cmp(&a.cpu_percent)),
        SortKey::Memory => list.sort_by(|a, b| b.memory_percent.total_cmp(&a.memory_percent)),
        SortKey::Pid => list.sort_by_key(|p| p.pid),
        SortKey::Name => list.sort_by(|a, b| a.name.cmp(&b.name)),
    }
}

/// Filter, gather up to the scan budget, sort, truncate.
///
/// Candidates are consumed lazily so nothing past the budget is inspected.
/// Failed candidates are skipped.
pub fn select_processes<I>(
    candidates: I,
    params: &ProcessInfoParams,
    policy: ProcessScanPolicy,
) -> Vec<ProcessInfo>
where
    I: IntoIterator<Item = Result<ProcessInfo, CollectError>>,
{
    let budget = policy.budget(params.limit);
    let mut gathered = Vec::with_capacity(budget.min(1024));
    for candidate in candidates {
        let info = match candidate {
            Ok(info) => info,
            Err(e) => {
                log::trace!("skipping process: {e}");
                continue;
            }
        };
        if !params.matches_name(&info.name) {
            continue;
        }
        gathered.push(info);
        if gathered.len() >= budget {
            break;
        }
    }
    sort_processes(&mut gathered, params.sort_by);
    gathered.truncate(params.limit);
    gathered
}

pub fn collect(
    params: &ProcessInfoParams,
    policy: ProcessScanPolicy,
) -> Result<ProcessInfoResult, CollectError> {
    let mut sys = System::new();
    let users = Users::new_with_refreshed_list();

    if params.pid > 0 {
        let pid = Pid::from_u32(params.pid);
        sample(&mut sys, Some(pid));
        let process = sys.process(pid).ok_or_else(|| CollectError::Process {
            pid: params.pid,
            reason: "process not found".to_string(),
        })?;
        let status = linux_status(pid).map_err(|reason| CollectError::Process {
            pid: params.pid,
            reason,
        })?;
        let info = details(pid, process, status.as_deref(), &users, sys.total_memory());
        return Ok(ProcessInfoResult {
            processes: vec![info],
            count: 1,
        });
    }

    sample(&mut sys, None);
    if sys.processes().is_empty() {
        return Err(CollectError::ProcessList(
            "process table is empty".to_string(),
        ));
    }
    let total_memory = sys.total_memory();
    let mut pids: Vec<Pid> = sys.processes().keys().copied().collect();
    pids.sort();

    let candidates = pids.into_iter().filter_map(|pid| {
        let status = match linux_status(pid) {
            Ok(status) => status,
            Err(reason) => {
                return Some(Err(CollectError::Process {
                    pid: pid.as_u32(),
                    reason,
                }));
            }
        };
        // sysinfo lists threads alongside processes on Linux.
        if let Some(tgid) = status.as_deref().and_then(|s| procfs::colon_u64(s, "Tgid"))
            && tgid != u64::from(pid.as_u32())
        {
            return None;
        }
        let result = match sys.process(pid) {
            Some(process) => Ok(details(pid, process, status.as_deref(), &users, total_memory)),
            None => Err(CollectError::Process {
                pid: pid.as_u32(),
                reason: "exited during scan".to_string(),
            }),
        };
        Some(result)
    });

    let processes = select_processes(candidates, params, policy);
    Ok(ProcessInfoResult {
        count: processes.len(),
        processes,
    })
}

/// Two refreshes one CPU-update interval apart so `cpu_usage()` is meaningful.
fn sample(sys: &mut System, only: Option<Pid>) {
    let kind = ProcessRefreshKind::everything();
    let refresh = |sys: &mut System| match only {
        Some(pid) => sys.refresh_processes_specifics(ProcessesToUpdate::Some(&[pid]), true, kind),
        None => sys.refresh_processes_specifics(ProcessesToUpdate::All, true, kind),
    };
    sys.refresh_memory();
    refresh(sys);
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL.max(Duration::from_millis(100)));
    refresh(sys);
}

/// Contents of `/proc/<pid>/status`, `Ok(None)` off Linux. A vanished
/// process is an error so the listing can skip it.
fn linux_status(pid: Pid) -> Result<Option<String>, String> {
    if !cfg!(target_os = "linux") {
        return Ok(None);
    }
    std::fs::read_to_string(format!("/proc/{pid}/status"))
        .map(Some)
        .map_err(|e| e.to_string())
}

fn details(
    pid: Pid,
    process: &Process,
    status: Option<&str>,
    users: &Users,
    total_memory: u64,
) -> ProcessInfo {
    let rss = process.memory();
    let memory_percent = if total_memory == 0 {
        0.0
    } else {
        rss as f64 / total_memory as f64 * 100.0
    };
    let num_threads = status
        .and_then(|s| procfs::colon_u64(s, "Threads"))
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .or_else(|| process.tasks().map(|t| u32::try_from(t.len()).unwrap_or(u32::MAX)))
        .unwrap_or(1);
    let username = process
        .user_id()
        .and_then(|uid| users.get_user_by_id(uid))
        .map(|u| u.name().to_string())
        .unwrap_or_default();

    ProcessInfo {
        pid: pid.as_u32(),
        name: process.name().to_string_lossy().into_owned(),
        status: process.status().to_string().to_lowercase(),
        cpu_percent: f64::from(process.cpu_usage()),
        memory_rss_bytes: rss,
        memory_vms_bytes: process.virtual_memory(),
        memory_percent,
        create_time: process.start_time().saturating_mul(1000),
        num_threads,
        username,
        cmdline: process
            .cmd()
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect(),
    }
}
