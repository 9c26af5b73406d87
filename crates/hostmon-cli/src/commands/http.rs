use hostmon_server::McpHandler;

pub const DEFAULT_PORT: u16 = 8081;

/// Port from `$PORT`, falling back to [`DEFAULT_PORT`] when unset or invalid.
pub fn port_from_env() -> u16 {
    parse_port(std::env::var("PORT").ok().as_deref())
}

fn parse_port(raw: Option<&str>) -> u16 {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => DEFAULT_PORT,
        Some(s) => s.parse().unwrap_or_else(|_| {
            log::warn!("ignoring invalid PORT {s:?}, using {DEFAULT_PORT}");
            DEFAULT_PORT
        }),
    }
}

/// Serve until the listener fails. Returns the process exit code.
pub fn run(host: &str, port: u16) -> i32 {
    log::info!("hostmon v{} starting HTTP transport", hostmon_core::VERSION);
    let rt = match super::runtime() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to start runtime: {e}");
            return 1;
        }
    };
    match rt.block_on(hostmon_server::run_http(McpHandler::default(), host, port)) {
        Ok(()) => 0,
        Err(e) => {
            log::error!("HTTP server error on {host}:{port}: {e}");
            1
        }
    }
}
