//! HTTP transport: JSON-RPC over `POST /mcp`, plus `GET /health`.

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, Bytes},
    extract::{Query, Request, State},
    http::{HeaderValue, Method, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{any, get},
};
use hostmon_core::{ErrorKind, SERVER_NAME, VERSION};
use serde::{Deserialize, Serialize};

use crate::config::ConfigStore;
use crate::error::FramingError;
use crate::jsonrpc::JsonRpcRequest;
use crate::mcp::McpHandler;

/// Largest request body read from a client.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared server state.
#[derive(Default)]
pub struct AppState {
    pub handler: McpHandler,
    pub config: ConfigStore,
}

impl AppState {
    pub fn new(handler: McpHandler) -> Self {
        Self {
            handler,
            config: ConfigStore::default(),
        }
    }
}

#[derive(Deserialize)]
struct McpQuery {
    config: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

impl IntoResponse for FramingError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, format!("{self}\n")).into_response()
    }
}

/// Headers every `/mcp` response carries, including errors and preflights.
async fn cors_headers(req: Request, next: Next) -> Response {
    let mut resp = next.run(req).await;
    let headers = resp.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static("*"));
    headers.insert(
        header::ACCESS_CONTROL_EXPOSE_HEADERS,
        HeaderValue::from_static("mcp-session-id, mcp-protocol-version"),
    );
    resp
}

async fn handle_mcp(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    body: Body,
) -> Response {
    if method == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }

    apply_query_config(&state, &uri);

    if method != Method::POST {
        return FramingError::MethodNotAllowed.into_response();
    }

    let bytes: Bytes = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => return reject(FramingError::UnreadableBody(e)),
    };
    let request: JsonRpcRequest = match serde_json::from_slice(&bytes) {
        Ok(request) => request,
        Err(e) => return reject(FramingError::InvalidJson(e)),
    };

    let verbose = state.config.load().enable_debug;
    if verbose {
        log::info!("MCP request: {}", String::from_utf8_lossy(&bytes));
    }

    match state.handler.handle(request, verbose).await {
        Some(resp) => Json(resp).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Swap in a `config` blob from the query string. A query that does not
/// parse is treated like a bad blob and never fails the request.
fn apply_query_config(state: &AppState, uri: &Uri) {
    match Query::<McpQuery>::try_from_uri(uri) {
        Ok(Query(query)) => {
            if let Some(blob) = query.config.as_deref().filter(|b| !b.is_empty()) {
                // Failures are logged by the store when debug is on; otherwise ignored.
                let _ = state.config.apply_blob(blob);
            }
        }
        Err(e) => {
            if state.config.load().enable_debug {
                log::warn!("{}: {e}", ErrorKind::ConfigurationParseFailure);
            }
        }
    }
}

fn reject(err: FramingError) -> Response {
    log::debug!("{}: {err}", err.kind());
    err.into_response()
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVER_NAME,
        version: VERSION,
    })
}

/// Build the axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(
            "/mcp",
            any(handle_mcp).layer(middleware::from_fn(cors_headers)),
        )
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Run the HTTP transport until the listener fails.
pub async fn run_http(handler: McpHandler, host: &str, port: u16) -> std::io::Result<()> {
    let app = build_router(Arc::new(AppState::new(handler)));
    let listener = tokio::net::TcpListener::bind((host, port)).await?;
    log::info!("HTTP server listening on {}", listener.local_addr()?);
    log::info!("MCP endpoint: /mcp");
    log::info!("Health check: /health");
    axum::serve(listener, app).await
}
