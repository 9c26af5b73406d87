//! Argument normalization.
//!
//! Tool arguments arrive as an untyped JSON object from either transport. Each
//! operation converts the bag into its typed parameter struct here, and nothing
//! downstream sees the raw values. Normalization never fails: missing or
//! wrongly-typed fields take their defaults and numeric fields are clamped into
//! their bounds.

use serde_json::{Map, Value};

/// Raw tool arguments as received on the wire.
pub type ArgumentBag = Map<String, Value>;

/// Default CPU sampling window in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
/// Shortest accepted CPU sampling window.
pub const MIN_INTERVAL_MS: u64 = 100;
/// Longest accepted CPU sampling window.
pub const MAX_INTERVAL_MS: u64 = 10_000;

/// Default number of processes returned.
pub const DEFAULT_PROCESS_LIMIT: usize = 10;
/// Hard cap on the number of processes returned.
pub const MAX_PROCESS_LIMIT: usize = 200;

/// Read an integer leniently: JSON integers, floats (truncated) and numeric strings.
fn int_field(args: &ArgumentBag, key: &str) -> Option<i64> {
    match args.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
            .or_else(|| n.as_f64().filter(|v| v.is_finite()).map(|v| v as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
        }
        _ => None,
    }
}

fn bool_field(args: &ArgumentBag, key: &str) -> Option<bool> {
    match args.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn string_field(args: &ArgumentBag, key: &str) -> String {
    match args.get(key) {
        Some(Value::String(s)) => s.clone(),
        _ => String::new(),
    }
}

/// Parameters for `get_cpu_info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuInfoParams {
    /// Report one usage figure per logical core instead of a single aggregate.
    pub per_cpu: bool,
    /// Sampling window, always within [`MIN_INTERVAL_MS`, `MAX_INTERVAL_MS`].
    pub interval_ms: u64,
}

impl Default for CpuInfoParams {
    fn default() -> Self {
        Self {
            per_cpu: false,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl CpuInfoParams {
    pub fn from_args(args: &ArgumentBag) -> Self {
        let per_cpu = bool_field(args, "per_cpu").unwrap_or(false);
        let interval_ms = match int_field(args, "interval_ms") {
            Some(ms) if ms > 0 => (ms as u64).clamp(MIN_INTERVAL_MS, MAX_INTERVAL_MS),
            _ => DEFAULT_INTERVAL_MS,
        };
        Self {
            per_cpu,
            interval_ms,
        }
    }
}

/// Parameters for `get_disk_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskInfoParams {
    /// Mountpoint to report on; empty means every mounted partition.
    pub path: String,
}

impl DiskInfoParams {
    pub fn from_args(args: &ArgumentBag) -> Self {
        Self {
            path: string_field(args, "path"),
        }
    }
}

/// Parameters for `get_network_info`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkInfoParams {
    /// Exact, case-sensitive interface name; empty means all interfaces.
    pub interface: String,
}

impl NetworkInfoParams {
    pub fn from_args(args: &ArgumentBag) -> Self {
        Self {
            interface: string_field(args, "interface"),
        }
    }

    /// Whether an interface passes the filter.
    pub fn matches(&self, name: &str) -> bool {
        self.interface.is_empty() || self.interface == name
    }
}

/// Ordering applied to a process listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    /// Descending by CPU percent.
    #[default]
    Cpu,
    /// Descending by memory percent.
    Memory,
    /// Ascending by pid.
    Pid,
    /// Ascending by name.
    Name,
}

impl SortKey {
    /// Parse a client-supplied key. Matching is exact and case-sensitive, so
    /// `"PID"` or `" pid"` fall back to [`SortKey::Cpu`] like any unknown value.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw {
            "memory" => Self::Memory,
            "pid" => Self::Pid,
            "name" => Self::Name,
            _ => Self::Cpu,
        }
    }
}

impl std::fmt::Display for SortKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Memory => write!(f, "memory"),
            Self::Pid => write!(f, "pid"),
            Self::Name => write!(f, "name"),
        }
    }
}

/// Parameters for `get_process_info`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfoParams {
    /// Single pid to look up; 0 lists processes instead.
    pub pid: u32,
    /// Case-insensitive name substring; empty matches everything.
    pub name: String,
    /// Maximum number of records, always within [1, [`MAX_PROCESS_LIMIT`]].
    pub limit: usize,
    pub sort_by: SortKey,
}

impl Default for ProcessInfoParams {
    fn default() -> Self {
        Self {
            pid: 0,
            name: String::new(),
            limit: DEFAULT_PROCESS_LIMIT,
            sort_by: SortKey::Cpu,
        }
    }
}

impl ProcessInfoParams {
    pub fn from_args(args: &ArgumentBag) -> Self {
        let pid = int_field(args, "pid")
            .filter(|p| *p > 0)
            .map(|p| u32::try_from(p).unwrap_or(u32::MAX))
            .unwrap_or(0);
        // Non-positive limits fall back to the default rather than the lower bound.
        let limit = match int_field(args, "limit") {
            Some(l) if l > 0 => usize::try_from(l)
                .unwrap_or(MAX_PROCESS_LIMIT)
                .min(MAX_PROCESS_LIMIT),
            _ => DEFAULT_PROCESS_LIMIT,
        };
        let sort_by = match args.get("sort_by") {
            Some(Value::String(s)) => SortKey::parse_lenient(s),
            _ => SortKey::Cpu,
        };
        Self {
            pid,
            name: string_field(args, "name"),
            limit,
            sort_by,
        }
    }

    /// Whether a process name passes the substring filter.
    pub fn matches_name(&self, candidate: &str) -> bool {
        self.name.is_empty() || candidate.to_lowercase().contains(&self.name.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(v: Value) -> ArgumentBag {
        match v {
            Value::Object(map) => map,
            _ => panic!("test bag must be an object"),
        }
    }

    // -----------------------------------------------------------------------
    // cpu
    // -----------------------------------------------------------------------

    #[test]
    fn cpu_defaults_on_empty_bag() {
        assert_eq!(
            CpuInfoParams::from_args(&ArgumentBag::new()),
            CpuInfoParams::default()
        );
    }

    #[test]
    fn cpu_interval_clamps_extremes() {
        let low = CpuInfoParams::from_args(&bag(json!({"interval_ms": 1})));
        assert_eq!(low.interval_ms, 100);
        let high = CpuInfoParams::from_args(&bag(json!({"interval_ms": 1_000_000})));
        assert_eq!(high.interval_ms, 10_000);
        let mid = CpuInfoParams::from_args(&bag(json!({"interval_ms": 250})));
        assert_eq!(mid.interval_ms, 250);
    }

    #[test]
    fn cpu_interval_non_positive_uses_default() {
        for v in [json!(0), json!(-5), json!("nope"), json!(null)] {
            let p = CpuInfoParams::from_args(&bag(json!({ "interval_ms": v })));
            assert_eq!(p.interval_ms, DEFAULT_INTERVAL_MS);
        }
    }

    #[test]
    fn cpu_accepts_loose_types() {
        let p = CpuInfoParams::from_args(&bag(json!({"per_cpu": "true", "interval_ms": 150.9})));
        assert!(p.per_cpu);
        assert_eq!(p.interval_ms, 150);
        let p = CpuInfoParams::from_args(&bag(json!({"per_cpu": 1, "interval_ms": "2000"})));
        assert!(!p.per_cpu);
        assert_eq!(p.interval_ms, 2000);
    }

    // -----------------------------------------------------------------------
    // disk / network
    // -----------------------------------------------------------------------

    #[test]
    fn disk_path_defaults_to_wildcard() {
        assert_eq!(DiskInfoParams::from_args(&ArgumentBag::new()).path, "");
        assert_eq!(DiskInfoParams::from_args(&bag(json!({"path": 7}))).path, "");
        assert_eq!(DiskInfoParams::from_args(&bag(json!({"path": "/"}))).path, "/");
    }

    #[test]
    fn network_filter_is_exact_and_case_sensitive() {
        let all = NetworkInfoParams::from_args(&ArgumentBag::new());
        assert!(all.matches("eth0"));
        assert!(all.matches("lo"));

        let eth = NetworkInfoParams::from_args(&bag(json!({"interface": "eth0"})));
        assert!(eth.matches("eth0"));
        assert!(!eth.matches("ETH0"));
        assert!(!eth.matches("eth01"));
    }

    // -----------------------------------------------------------------------
    // process
    // -----------------------------------------------------------------------

    #[test]
    fn process_defaults() {
        let p = ProcessInfoParams::from_args(&ArgumentBag::new());
        assert_eq!(p, ProcessInfoParams::default());
        assert_eq!(p.limit, 10);
        assert_eq!(p.sort_by, SortKey::Cpu);
    }

    #[test]
    fn process_limit_upper_bound_clamps() {
        let p = ProcessInfoParams::from_args(&bag(json!({"limit": 5000})));
        assert_eq!(p.limit, MAX_PROCESS_LIMIT);
        let p = ProcessInfoParams::from_args(&bag(json!({"limit": 200})));
        assert_eq!(p.limit, 200);
        let p = ProcessInfoParams::from_args(&bag(json!({"limit": 1})));
        assert_eq!(p.limit, 1);
    }

    #[test]
    fn process_limit_non_positive_falls_back_to_default() {
        for v in [0, -1, -200] {
            let p = ProcessInfoParams::from_args(&bag(json!({ "limit": v })));
            assert_eq!(p.limit, DEFAULT_PROCESS_LIMIT, "limit {v}");
        }
    }

    #[test]
    fn process_sort_key_parsing() {
        assert_eq!(SortKey::parse_lenient("memory"), SortKey::Memory);
        assert_eq!(SortKey::parse_lenient("pid"), SortKey::Pid);
        assert_eq!(SortKey::parse_lenient("name"), SortKey::Name);
        assert_eq!(SortKey::parse_lenient("PID"), SortKey::Cpu);
        assert_eq!(SortKey::parse_lenient(" name "), SortKey::Cpu);
        assert_eq!(SortKey::parse_lenient("cpu"), SortKey::Cpu);
        assert_eq!(SortKey::parse_lenient("disk"), SortKey::Cpu);
        assert_eq!(SortKey::parse_lenient(""), SortKey::Cpu);
        let p = ProcessInfoParams::from_args(&bag(json!({"sort_by": 3})));
        assert_eq!(p.sort_by, SortKey::Cpu);
    }

    #[test]
    fn process_pid_negative_is_unfiltered() {
        let p = ProcessInfoParams::from_args(&bag(json!({"pid": -4})));
        assert_eq!(p.pid, 0);
        let p = ProcessInfoParams::from_args(&bag(json!({"pid": 4321})));
        assert_eq!(p.pid, 4321);
    }

    #[test]
    fn process_name_filter_ignores_case() {
        let p = ProcessInfoParams::from_args(&bag(json!({"name": "SSH"})));
        assert!(p.matches_name("sshd"));
        assert!(p.matches_name("OpenSSH-agent"));
        assert!(!p.matches_name("bash"));
        assert!(ProcessInfoParams::default().matches_name("anything"));
    }
}
