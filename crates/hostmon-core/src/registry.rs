//! The fixed catalogue of operations.
//!
//! [`OPERATIONS`] is the only place an operation's name, description,
//! parameter schema and collector are declared. Dispatch and both transports'
//! discovery listings are derived from it.

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::args::{
    ArgumentBag, CpuInfoParams, DEFAULT_INTERVAL_MS, DEFAULT_PROCESS_LIMIT, DiskInfoParams,
    MAX_INTERVAL_MS, MAX_PROCESS_LIMIT, MIN_INTERVAL_MS, NetworkInfoParams, ProcessInfoParams,
};
use crate::error::CollectError;
use crate::probe::HostProbe;

/// Normalizes the argument bag, calls the probe and encodes the record.
pub type Invoke = fn(&dyn HostProbe, &ArgumentBag) -> Result<Value, CollectError>;

/// JSON type tag advertised for a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    Boolean,
    Integer,
    String,
}

impl ParamType {
    pub fn json_type(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }
}

/// Advertised default for a parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamDefault {
    Bool(bool),
    Int(i64),
    Str(&'static str),
}

/// One declared parameter of an operation.
///
/// Only used for discovery. The normalizer in [`crate::args`] enforces the
/// real contract.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub description: &'static str,
    pub default: Option<ParamDefault>,
    /// Inclusive `(minimum, maximum)` for integers.
    pub bounds: Option<(i64, i64)>,
    /// Accepted values for enumerated strings.
    pub choices: &'static [&'static str],
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamType, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            default: None,
            bounds: None,
            choices: &[],
        }
    }

    const fn with_default(mut self, default: ParamDefault) -> Self {
        self.default = Some(default);
        self
    }

    const fn with_bounds(mut self, min: i64, max: i64) -> Self {
        self.bounds = Some((min, max));
        self
    }

    const fn with_choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = choices;
        self
    }

    /// JSON-schema fragment for this parameter.
    pub fn schema(&self) -> Value {
        let mut prop = Map::new();
        prop.insert("type".into(), json!(self.kind.json_type()));
        prop.insert("description".into(), json!(self.description));
        match self.default {
            Some(ParamDefault::Bool(b)) => {
                prop.insert("default".into(), json!(b));
            }
            Some(ParamDefault::Int(i)) => {
                prop.insert("default".into(), json!(i));
            }
            Some(ParamDefault::Str(s)) => {
                prop.insert("default".into(), json!(s));
            }
            None => {}
        }
        if let Some((min, max)) = self.bounds {
            prop.insert("minimum".into(), json!(min));
            prop.insert("maximum".into(), json!(max));
        }
        if !self.choices.is_empty() {
            prop.insert("enum".into(), json!(self.choices));
        }
        Value::Object(prop)
    }
}

/// A named telemetry operation.
#[derive(Debug, Clone, Copy)]
pub struct Operation {
    /// Unique tool name, e.g. `"get_cpu_info"`.
    pub name: &'static str,
    pub description: &'static str,
    /// Fixed status line returned on success.
    pub status: &'static str,
    pub params: &'static [ParamSpec],
    pub invoke: Invoke,
}

impl Operation {
    /// MCP tool descriptor: `{name, description, inputSchema}`.
    pub fn descriptor(&self) -> Value {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": {
                "type": "object",
                "properties": properties,
            },
        })
    }
}

fn encode<T: Serialize>(record: T) -> Result<Value, CollectError> {
    Ok(serde_json::to_value(record)?)
}

fn invoke_system(probe: &dyn HostProbe, _args: &ArgumentBag) -> Result<Value, CollectError> {
    encode(probe.system_info()?)
}

fn invoke_cpu(probe: &dyn HostProbe, args: &ArgumentBag) -> Result<Value, CollectError> {
    encode(probe.cpu_info(&CpuInfoParams::from_args(args))?)
}

fn invoke_memory(probe: &dyn HostProbe, _args: &ArgumentBag) -> Result<Value, CollectError> {
    encode(probe.memory_info()?)
}

fn invoke_disk(probe: &dyn HostProbe, args: &ArgumentBag) -> Result<Value, CollectError> {
    encode(probe.disk_info(&DiskInfoParams::from_args(args))?)
}

fn invoke_network(probe: &dyn HostProbe, args: &ArgumentBag) -> Result<Value, CollectError> {
    encode(probe.network_info(&NetworkInfoParams::from_args(args))?)
}

fn invoke_process(probe: &dyn HostProbe, args: &ArgumentBag) -> Result<Value, CollectError> {
    encode(probe.process_info(&ProcessInfoParams::from_args(args))?)
}

fn invoke_load(probe: &dyn HostProbe, _args: &ArgumentBag) -> Result<Value, CollectError> {
    encode(probe.load_average()?)
}

const CPU_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("per_cpu", ParamType::Boolean, "Get per-CPU usage if true")
        .with_default(ParamDefault::Bool(false)),
    ParamSpec::new(
        "interval_ms",
        ParamType::Integer,
        "Sampling window in ms (100..10000)",
    )
    .with_default(ParamDefault::Int(DEFAULT_INTERVAL_MS as i64))
    .with_bounds(MIN_INTERVAL_MS as i64, MAX_INTERVAL_MS as i64),
];

const DISK_PARAMS: &[ParamSpec] = &[ParamSpec::new(
    "path",
    ParamType::String,
    "Specific path to check; if empty, all mounts",
)];

const NETWORK_PARAMS: &[ParamSpec] = &[ParamSpec::new(
    "interface",
    ParamType::String,
    "Specific interface to include",
)];

const PROCESS_PARAMS: &[ParamSpec] = &[
    ParamSpec::new("pid", ParamType::Integer, "Specific PID"),
    ParamSpec::new("name", ParamType::String, "Filter by name substring"),
    ParamSpec::new("limit", ParamType::Integer, "Max results (1..200, default 10)")
        .with_default(ParamDefault::Int(DEFAULT_PROCESS_LIMIT as i64))
        .with_bounds(1, MAX_PROCESS_LIMIT as i64),
    ParamSpec::new("sort_by", ParamType::String, "Sort by: cpu|memory|pid|name")
        .with_default(ParamDefault::Str("cpu"))
        .with_choices(&["cpu", "memory", "pid", "name"]),
];

/// Every operation the server answers, in discovery order.
pub static OPERATIONS: &[Operation] = &[
    Operation {
        name: "get_system_info",
        description: "Get comprehensive system information including hostname, OS, platform, uptime, etc.",
        status: "System information retrieved",
        params: &[],
        invoke: invoke_system,
    },
    Operation {
        name: "get_cpu_info",
        description: "Get detailed CPU usage statistics and information",
        status: "CPU information retrieved",
        params: CPU_PARAMS,
        invoke: invoke_cpu,
    },
    Operation {
        name: "get_memory_info",
        description: "Get memory usage information including RAM and swap",
        status: "Memory information retrieved",
        params: &[],
        invoke: invoke_memory,
    },
    Operation {
        name: "get_disk_info",
        description: "Get disk usage information for all partitions or a specific path",
        status: "Disk information retrieved",
        params: DISK_PARAMS,
        invoke: invoke_disk,
    },
    Operation {
        name: "get_network_info",
        description: "Get network interface statistics and information",
        status: "Network information retrieved",
        params: NETWORK_PARAMS,
        invoke: invoke_network,
    },
    Operation {
        name: "get_process_info",
        description: "Get information about running processes with filtering and sorting options",
        status: "Process information retrieved",
        params: PROCESS_PARAMS,
        invoke: invoke_process,
    },
    Operation {
        name: "get_load_average",
        description: "Get system load average (1, 5, and 15 minute averages)",
        status: "Load average retrieved",
        params: &[],
        invoke: invoke_load,
    },
];

/// Read-only view over [`OPERATIONS`].
pub struct Registry;

impl Registry {
    pub fn operations() -> &'static [Operation] {
        OPERATIONS
    }

    pub fn lookup(name: &str) -> Option<&'static Operation> {
        OPERATIONS.iter().find(|op| op.name == name)
    }

    pub fn names() -> impl Iterator<Item = &'static str> {
        OPERATIONS.iter().map(|op| op.name)
    }

    /// The `tools` array for an MCP `tools/list` response.
    pub fn discovery() -> Vec<Value> {
        OPERATIONS.iter().map(Operation::descriptor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seven_unique_names() {
        let names: Vec<&str> = Registry::names().collect();
        assert_eq!(names.len(), 7);
        let unique: HashSet<&str> = names.iter().copied().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn lookup_is_exact() {
        assert!(Registry::lookup("get_cpu_info").is_some());
        assert!(Registry::lookup("GET_CPU_INFO").is_none());
        assert!(Registry::lookup("get_gpu_info").is_none());
        assert_eq!(
            Registry::lookup("get_load_average").map(|op| op.status),
            Some("Load average retrieved")
        );
    }

    #[test]
    fn discovery_lists_every_parameter() {
        let tools = Registry::discovery();
        assert_eq!(tools.len(), OPERATIONS.len());
        for (tool, op) in tools.iter().zip(OPERATIONS) {
            assert_eq!(tool["name"], op.name);
            assert_eq!(tool["inputSchema"]["type"], "object");
            let props = tool["inputSchema"]["properties"].as_object().unwrap();
            assert_eq!(props.len(), op.params.len());
            for p in op.params {
                assert_eq!(props[p.name]["type"], p.kind.json_type());
            }
        }
    }

    #[test]
    fn schema_carries_bounds_and_choices() {
        let cpu = Registry::lookup("get_cpu_info").unwrap().descriptor();
        let interval = &cpu["inputSchema"]["properties"]["interval_ms"];
        assert_eq!(interval["minimum"], 100);
        assert_eq!(interval["maximum"], 10_000);
        assert_eq!(interval["default"], 1000);

        let procs = Registry::lookup("get_process_info").unwrap().descriptor();
        let sort_by = &procs["inputSchema"]["properties"]["sort_by"];
        assert_eq!(sort_by["enum"], json!(["cpu", "memory", "pid", "name"]));
        assert!(procs["inputSchema"]["properties"]["pid"].get("default").is_none());
    }

    #[test]
    fn parameterless_operations_have_empty_properties() {
        let sys = Registry::lookup("get_system_info").unwrap().descriptor();
        assert_eq!(sys["inputSchema"]["properties"], json!({}));
    }
}
