use hostmon_server::McpHandler;

/// Serve stdin until EOF. Read errors end the session but are not fatal.
pub fn run() -> i32 {
    log::info!("hostmon v{} serving MCP on stdio", hostmon_core::VERSION);
    let rt = match super::runtime() {
        Ok(rt) => rt,
        Err(e) => {
            log::error!("failed to start runtime: {e}");
            return 1;
        }
    };
    if let Err(e) = rt.block_on(hostmon_server::run_stdio(McpHandler::default())) {
        log::error!("{}: {e}", e.kind());
    }
    0
}
