//! Error taxonomy shared by the dispatcher and both transports.

use serde::Serialize;

/// Classification carried by every failure envelope and log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// Requested operation name is not in the registry.
    UnknownOperation,
    /// The underlying OS or metrics query failed.
    CollectionFailure,
    /// Malformed request at the transport boundary (bad JSON, wrong method, unreadable body).
    InvalidRequestFraming,
    /// Malformed runtime-configuration blob. Logged, never returned to a caller.
    ConfigurationParseFailure,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownOperation => write!(f, "UnknownOperation"),
            Self::CollectionFailure => write!(f, "CollectionFailure"),
            Self::InvalidRequestFraming => write!(f, "InvalidRequestFraming"),
            Self::ConfigurationParseFailure => write!(f, "ConfigurationParseFailure"),
        }
    }
}

/// A collector sub-step failed.
///
/// Each variant names the step that failed so the rendered message reads like
/// `failed to get host info: <cause>`.
#[derive(Debug, thiserror::Error)]
pub enum CollectError {
    #[error("failed to get host info: {0}")]
    HostInfo(String),
    #[error("failed to get CPU usage: {0}")]
    CpuUsage(String),
    #[error("failed to get CPU info: {0}")]
    CpuInfo(String),
    #[error("failed to get virtual memory: {0}")]
    VirtualMemory(String),
    #[error("failed to get swap memory: {0}")]
    SwapMemory(String),
    #[error("failed to get disk usage for {path}: {source}")]
    DiskUsage {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to get disk partitions: {0}")]
    DiskPartitions(String),
    #[error("failed to get network stats: {0}")]
    NetworkStats(String),
    #[error("failed to get process {pid}: {reason}")]
    Process { pid: u32, reason: String },
    #[error("failed to list processes: {0}")]
    ProcessList(String),
    #[error("failed to get load average: {0}")]
    LoadAverage(String),
    #[error("failed to encode result: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Why a dispatch produced a failure envelope.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown tool: {name}")]
    UnknownOperation { name: String },
    #[error("{source}")]
    Collection {
        operation: &'static str,
        #[source]
        source: CollectError,
    },
}

impl DispatchError {
    /// Classification used in the failure envelope.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOperation { .. } => ErrorKind::UnknownOperation,
            Self::Collection { .. } => ErrorKind::CollectionFailure,
        }
    }

    /// The operation whose collector failed, if it got that far.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            Self::UnknownOperation { .. } => None,
            Self::Collection { operation, .. } => Some(operation),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collect_error_names_failing_step() {
        let err = CollectError::HostInfo("no uname".to_string());
        assert_eq!(err.to_string(), "failed to get host info: no uname");

        let err = CollectError::DiskUsage {
            path: "/nope".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(err.to_string().starts_with("failed to get disk usage for /nope: "));
    }

    #[test]
    fn dispatch_error_kinds() {
        let unknown = DispatchError::UnknownOperation {
            name: "get_gpu_info".to_string(),
        };
        assert_eq!(unknown.kind(), ErrorKind::UnknownOperation);
        assert_eq!(unknown.to_string(), "unknown tool: get_gpu_info");
        assert_eq!(unknown.operation(), None);

        let failed = DispatchError::Collection {
            operation: "get_load_average",
            source: CollectError::LoadAverage("getloadavg returned -1".to_string()),
        };
        assert_eq!(failed.kind(), ErrorKind::CollectionFailure);
        assert_eq!(failed.operation(), Some("get_load_average"));
        assert_eq!(
            failed.to_string(),
            "failed to get load average: getloadavg returned -1"
        );
    }

    #[test]
    fn error_kind_display_matches_serialized_name() {
        for kind in [
            ErrorKind::UnknownOperation,
            ErrorKind::CollectionFailure,
            ErrorKind::InvalidRequestFraming,
            ErrorKind::ConfigurationParseFailure,
        ] {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.to_string()));
        }
    }
}
