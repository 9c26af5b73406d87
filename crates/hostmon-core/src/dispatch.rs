//! The single entry point both transports call through.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::args::ArgumentBag;
use crate::error::{DispatchError, ErrorKind};
use crate::probe::{HostProbe, LiveHost};
use crate::registry::Registry;

/// Outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Envelope {
    Success {
        /// Fixed human-readable status, e.g. `"CPU information retrieved"`.
        status: &'static str,
        payload: Value,
    },
    Failure {
        kind: ErrorKind,
        message: String,
    },
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    fn from_error(err: &DispatchError) -> Self {
        Self::Failure {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Routes operation names to collectors on a shared [`HostProbe`].
#[derive(Clone)]
pub struct Dispatcher {
    probe: Arc<dyn HostProbe>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Arc::new(LiveHost::new()))
    }
}

impl Dispatcher {
    pub fn new(probe: Arc<dyn HostProbe>) -> Self {
        Self { probe }
    }

    /// Look up, normalize, collect once, wrap.
    ///
    /// Never panics on client input and never retries. May block for the
    /// CPU sampling window.
    pub fn dispatch(&self, name: &str, args: &ArgumentBag) -> Envelope {
        match self.try_dispatch(name, args) {
            Ok((status, payload)) => {
                log::debug!("{name}: {status}");
                Envelope::Success { status, payload }
            }
            Err(err) => {
                match err.operation() {
                    Some(operation) => log::warn!("{operation} failed ({}): {err}", err.kind()),
                    None => log::warn!("{name} rejected ({}): {err}", err.kind()),
                }
                Envelope::from_error(&err)
            }
        }
    }

    fn try_dispatch(
        &self,
        name: &str,
        args: &ArgumentBag,
    ) -> Result<(&'static str, Value), DispatchError> {
        let op = Registry::lookup(name).ok_or_else(|| DispatchError::UnknownOperation {
            name: name.to_string(),
        })?;
        let payload = (op.invoke)(self.probe.as_ref(), args).map_err(|source| {
            DispatchError::Collection {
                operation: op.name,
                source,
            }
        })?;
        Ok((op.status, payload))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::{CpuInfoParams, DiskInfoParams, NetworkInfoParams, ProcessInfoParams};
    use crate::collect::{
        CpuInfo, DiskInfoResult, LoadAverage, MemoryInfo, NetworkInfoResult, ProcessInfoResult,
        SystemInfo,
    };
    use crate::error::CollectError;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the normalized params it receives and fails where told to.
    #[derive(Default)]
    struct ScriptedHost {
        cpu_seen: Mutex<Vec<CpuInfoParams>>,
        process_seen: Mutex<Vec<ProcessInfoParams>>,
        fail_load: bool,
    }

    impl HostProbe for ScriptedHost {
        fn system_info(&self) -> Result<SystemInfo, CollectError> {
            Err(CollectError::HostInfo("uname failed".to_string()))
        }

        fn cpu_info(&self, params: &CpuInfoParams) -> Result<CpuInfo, CollectError> {
            self.cpu_seen.lock().unwrap().push(*params);
            let n = if params.per_cpu { 4 } else { 1 };
            Ok(CpuInfo {
                usage_percent: vec![12.5; n],
                logical_count: 4,
                physical_count: 2,
                model_name: "Test CPU".to_string(),
                family: "6".to_string(),
                speed_mhz: 2400.0,
                cache_size: 8192,
                flags: Vec::new(),
            })
        }

        fn memory_info(&self) -> Result<MemoryInfo, CollectError> {
            Err(CollectError::SwapMemory("no swap accounting".to_string()))
        }

        fn disk_info(&self, params: &DiskInfoParams) -> Result<DiskInfoResult, CollectError> {
            Err(CollectError::DiskUsage {
                path: params.path.clone(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }

        fn network_info(&self, _params: &NetworkInfoParams) -> Result<NetworkInfoResult, CollectError> {
            Ok(NetworkInfoResult {
                interfaces: Vec::new(),
            })
        }

        fn process_info(&self, params: &ProcessInfoParams) -> Result<ProcessInfoResult, CollectError> {
            self.process_seen.lock().unwrap().push(params.clone());
            Ok(ProcessInfoResult {
                processes: Vec::new(),
                count: 0,
            })
        }

        fn load_average(&self) -> Result<LoadAverage, CollectError> {
            if self.fail_load {
                return Err(CollectError::LoadAverage("getloadavg returned -1".to_string()));
            }
            Ok(LoadAverage {
                load1: 1.0,
                load5: 0.5,
                load15: 0.25,
            })
        }
    }

    fn bag(v: Value) -> ArgumentBag {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn unknown_operation_is_failure_envelope() {
        let d = Dispatcher::new(Arc::new(ScriptedHost::default()));
        let env = d.dispatch("get_gpu_info", &ArgumentBag::new());
        assert_eq!(
            env,
            Envelope::Failure {
                kind: ErrorKind::UnknownOperation,
                message: "unknown tool: get_gpu_info".to_string(),
            }
        );
    }

    #[test]
    fn success_carries_status_and_payload() {
        let d = Dispatcher::new(Arc::new(ScriptedHost::default()));
        match d.dispatch("get_load_average", &ArgumentBag::new()) {
            Envelope::Success { status, payload } => {
                assert_eq!(status, "Load average retrieved");
                assert_eq!(payload, json!({"load1": 1.0, "load5": 0.5, "load15": 0.25}));
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[test]
    fn collector_error_text_is_preserved() {
        let d = Dispatcher::new(Arc::new(ScriptedHost {
            fail_load: true,
            ..ScriptedHost::default()
        }));
        let env = d.dispatch("get_load_average", &ArgumentBag::new());
        assert_eq!(
            env,
            Envelope::Failure {
                kind: ErrorKind::CollectionFailure,
                message: "failed to get load average: getloadavg returned -1".to_string(),
            }
        );

        match d.dispatch("get_system_info", &ArgumentBag::new()) {
            Envelope::Failure { kind, message } => {
                assert_eq!(kind, ErrorKind::CollectionFailure);
                assert_eq!(message, "failed to get host info: uname failed");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn collection_failure_records_operation() {
        let d = Dispatcher::new(Arc::new(ScriptedHost {
            fail_load: true,
            ..ScriptedHost::default()
        }));
        let err = d
            .try_dispatch("get_load_average", &ArgumentBag::new())
            .unwrap_err();
        assert_eq!(err.operation(), Some("get_load_average"));

        let err = d.try_dispatch("get_gpu_info", &ArgumentBag::new()).unwrap_err();
        assert_eq!(err.operation(), None);
    }

    #[test]
    fn disk_failure_names_the_path() {
        let d = Dispatcher::new(Arc::new(ScriptedHost::default()));
        match d.dispatch("get_disk_info", &bag(json!({"path": "/srv"}))) {
            Envelope::Failure { message, .. } => {
                assert!(message.starts_with("failed to get disk usage for /srv: "));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[test]
    fn arguments_are_normalized_before_the_probe() {
        let host = Arc::new(ScriptedHost::default());
        let d = Dispatcher::new(host.clone());

        let env = d.dispatch("get_cpu_info", &bag(json!({"per_cpu": true, "interval_ms": 1})));
        assert!(env.is_success());
        d.dispatch("get_cpu_info", &bag(json!({"interval_ms": 1_000_000})));
        let cpu = host.cpu_seen.lock().unwrap().clone();
        assert_eq!(
            cpu,
            vec![
                CpuInfoParams { per_cpu: true, interval_ms: 100 },
                CpuInfoParams { per_cpu: false, interval_ms: 10_000 },
            ]
        );

        d.dispatch(
            "get_process_info",
            &bag(json!({"limit": 0, "sort_by": "bogus", "name": "ssh", "pid": -3})),
        );
        let procs = host.process_seen.lock().unwrap().clone();
        assert_eq!(procs.len(), 1);
        assert_eq!(procs[0].limit, 10);
        assert_eq!(procs[0].sort_by, crate::args::SortKey::Cpu);
        assert_eq!(procs[0].pid, 0);
        assert_eq!(procs[0].name, "ssh");
    }

    #[test]
    fn per_cpu_payload_length() {
        let d = Dispatcher::new(Arc::new(ScriptedHost::default()));
        let Envelope::Success { payload, .. } =
            d.dispatch("get_cpu_info", &bag(json!({"per_cpu": true})))
        else {
            panic!("expected success");
        };
        assert_eq!(
            payload["usage_percent"].as_array().unwrap().len() as u64,
            payload["logical_count"].as_u64().unwrap()
        );
    }

    #[test]
    fn every_registered_operation_dispatches() {
        let d = Dispatcher::new(Arc::new(ScriptedHost::default()));
        for name in Registry::names() {
            let env = d.dispatch(name, &ArgumentBag::new());
            if let Envelope::Failure { kind, .. } = env {
                assert_eq!(kind, ErrorKind::CollectionFailure, "{name}");
            }
        }
    }
}
