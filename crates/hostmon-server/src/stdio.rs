//! Newline-delimited JSON-RPC over stdin/stdout.
//!
//! Each line is handled on its own task so a slow CPU sample does not hold up
//! a `ping`. Responses may therefore be written out of order; clients match
//! them by `id`. stdout carries protocol frames only; logs go to stderr.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tokio::task::JoinSet;

use crate::error::FramingError;
use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse, PARSE_ERROR};
use crate::mcp::McpHandler;

/// Serve stdin until EOF, then wait for in-flight requests.
pub async fn run_stdio(handler: McpHandler) -> Result<(), FramingError> {
    let reader = BufReader::new(tokio::io::stdin());
    serve_lines(handler, reader, tokio::io::stdout()).await
}

/// The transport loop over any line reader and writer.
///
/// A line that is not UTF-8 or not JSON gets a -32700 reply and the loop
/// moves on. Only an I/O error ends the session early, and in-flight requests
/// are still answered before it returns.
pub async fn serve_lines<R, W>(handler: McpHandler, mut reader: R, writer: W) -> Result<(), FramingError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let writer = Arc::new(Mutex::new(writer));
    let mut in_flight = JoinSet::new();
    let mut buf = Vec::new();

    let outcome = loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(FramingError::Io(e)),
        }

        let request = match parse_line(&buf) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(err) => {
                log::warn!("{}: {err}", err.kind());
                let resp = JsonRpcResponse::error(None, PARSE_ERROR, "Parse error");
                if let Err(e) = write_frame(&writer, &resp).await {
                    break Err(FramingError::Io(e));
                }
                continue;
            }
        };

        let handler = handler.clone();
        let writer = Arc::clone(&writer);
        in_flight.spawn(async move {
            if let Some(resp) = handler.handle(request, false).await
                && let Err(e) = write_frame(&writer, &resp).await
            {
                log::error!("failed to write response: {e}");
            }
        });

        // Reap finished tasks so the set does not grow with a long session.
        while in_flight.try_join_next().is_some() {}
    };

    log::debug!("input finished; draining {} in-flight request(s)", in_flight.len());
    while in_flight.join_next().await.is_some() {}
    outcome
}

/// Decode one raw line. `Ok(None)` for blank lines.
fn parse_line(raw: &[u8]) -> Result<Option<JsonRpcRequest>, FramingError> {
    let line = std::str::from_utf8(raw)?.trim();
    if line.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_str(line)?))
}

/// Write one response line. The lock keeps lines from interleaving.
async fn write_frame<W>(writer: &Mutex<W>, resp: &JsonRpcResponse) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serde_json::to_vec(resp).map_err(std::io::Error::other)?;
    line.push(b'\n');
    let mut guard = writer.lock().await;
    guard.write_all(&line).await?;
    guard.flush().await
}
