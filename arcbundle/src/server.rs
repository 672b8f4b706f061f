//! HTTP front end for [`TileEndpoint`].
//!
//! Routes:
//!
//! - `GET /tiles/{z}/{x}/{y}` with an optional `.png` / `.jpg` suffix on `y`
//! - `GET /health`
//!
//! Tile lookups are blocking file reads, so each one runs on tokio's
//! blocking pool. When a request timeout is configured, a lookup that does
//! not finish in time is answered with `504 Gateway Timeout`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path as AxumPath, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

use crate::endpoint::{EndpointError, TileEndpoint, TileResponse};

/// Default per-request deadline in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct ServerState {
    endpoint: Arc<TileEndpoint>,
    request_timeout: Option<Duration>,
}

impl ServerState {
    pub fn new(endpoint: TileEndpoint) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            request_timeout: Some(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS)),
        }
    }

    /// Set or disable (`None`) the per-request deadline.
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &TileEndpoint {
        &self.endpoint
    }
}

/// Errors from running the HTTP server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the router for `state`.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/tiles/:z/:x/:y", get(get_tile))
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, state: ServerState) -> Result<(), ServerError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    serve_with_shutdown(listener, state, shutdown_signal()).await
}

/// Serve on an already bound listener until `shutdown` completes.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: ServerState,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(
            addr = %addr,
            root = %state.endpoint.root().display(),
            offset_mode = %state.endpoint.offset_mode(),
            "Tile server listening"
        );
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)?;

    info!("Tile server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
    }
}

async fn health() -> impl IntoResponse {
    "ok"
}

async fn get_tile(
    State(state): State<ServerState>,
    AxumPath((z, x, y)): AxumPath<(u8, u32, String)>,
) -> Response {
    let Some(y) = parse_row(&y) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let endpoint = Arc::clone(&state.endpoint);
    let lookup = tokio::task::spawn_blocking(move || endpoint.fetch(x, y, z));

    let joined = match state.request_timeout {
        Some(limit) => match tokio::time::timeout(limit, lookup).await {
            Ok(joined) => joined,
            Err(_) => {
                warn!(z, x, y, timeout_ms = limit.as_millis() as u64, "Tile request timed out");
                return StatusCode::GATEWAY_TIMEOUT.into_response();
            }
        },
        None => lookup.await,
    };

    let result = match joined {
        Ok(result) => result,
        Err(e) => {
            error!(z, x, y, error = %e, "Tile lookup task failed");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    tile_response(result)
}

/// Map a lookup result to an HTTP response.
fn tile_response(result: Result<TileResponse, EndpointError>) -> Response {
    match result {
        Ok(TileResponse::Found {
            bytes,
            content_type,
        }) => {
            let mut resp = Response::new(bytes.into());
            resp.headers_mut()
                .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
            resp
        }
        Ok(TileResponse::NotFound) => StatusCode::NOT_FOUND.into_response(),
        Err(e) if e.is_client_error() => {
            debug!(error = %e, "Rejected tile request");
            StatusCode::BAD_REQUEST.into_response()
        }
        Err(e) => {
            error!(error = %e, "Tile lookup failed");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Row from the last path segment, with an optional image extension.
fn parse_row(segment: &str) -> Option<u32> {
    let trimmed = segment
        .strip_suffix(".png")
        .or_else(|| segment.strip_suffix(".jpg"))
        .unwrap_or(segment);
    trimmed.parse().ok()
}
