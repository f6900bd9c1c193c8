//! Proxy server: accept loop and per-connection request pipeline.
//!
//! # Responsibilities
//! - Accept connections from the bounded listener
//! - Drive one request/response cycle per connection:
//!   parse → cache lookup → route → fetch → store → respond
//! - Guarantee the connection closes after exactly one response
//!
//! # Pipeline ordering
//! The cache check strictly precedes upstream routing; the router is
//! consulted only on a miss. The fetched body is persisted before the client
//! write, so a response implies the write-through already happened.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::broadcast;

use crate::cache::CacheStore;
use crate::config::ProxyConfig;
use crate::http::request::RequestLine;
use crate::http::response;
use crate::net::{ConnectionId, Listener, ListenerError};
use crate::routing::MirrorRouter;
use crate::upstream::{UpstreamError, UpstreamFetcher};

/// Request lines longer than this are treated as malformed.
const MAX_REQUEST_LINE: u64 = 8 * 1024;

/// Shared, immutable state handed to every connection task.
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<MirrorRouter>,
    pub cache: Arc<CacheStore>,
    pub fetcher: Arc<UpstreamFetcher>,
}

/// The caching proxy server.
pub struct ProxyServer {
    config: ProxyConfig,
    state: AppState,
}

impl ProxyServer {
    /// Create a new server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState {
            router: Arc::new(MirrorRouter::from_config(&config.mirrors)),
            cache: Arc::new(CacheStore::from_config(&config.cache)),
            fetcher: Arc::new(UpstreamFetcher::from_config(&config.upstream)?),
        };
        Ok(Self { config, state })
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the accept loop until the shutdown signal fires.
    ///
    /// Each accepted connection is served on its own task; a failure in one
    /// connection never affects another.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), ListenerError> {
        let addr = listener.local_addr().map_err(ListenerError::Bind)?;
        tracing::info!(
            address = %addr,
            mirrors = self.state.router.len(),
            "Proxy server starting"
        );

        loop {
            tokio::select! {
                accepted = listener.accept() => {
                    let (stream, peer, permit) = accepted?;
                    let state = self.state.clone();
                    tokio::spawn(async move {
                        let id = ConnectionId::new();
                        handle_connection(state, stream, id).await;
                        tracing::trace!(connection_id = %id, peer_addr = %peer, "Connection closed");
                        drop(permit);
                    });
                }
                _ = shutdown.recv() => {
                    tracing::info!("Shutdown signal received, no longer accepting");
                    break;
                }
            }
        }

        tracing::info!("Proxy server stopped");
        Ok(())
    }
}

/// Serve one connection: exactly one request, one response, then close.
async fn handle_connection(state: AppState, stream: TcpStream, id: ConnectionId) {
    let (read_half, mut write_half) = stream.into_split();
    let reader = BufReader::new(read_half);

    if let Err(e) = serve_request(&state, id, reader, &mut write_half).await {
        tracing::error!(connection_id = %id, error = %e, "Connection I/O failure");
    }
    let _ = write_half.shutdown().await;
}

/// The request pipeline, generic over the transport for testability.
pub async fn serve_request<R, W>(
    state: &AppState,
    id: ConnectionId,
    reader: BufReader<R>,
    writer: &mut W,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = String::new();
    let mut limited = reader.take(MAX_REQUEST_LINE);
    match limited.read_line(&mut line).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            tracing::error!(connection_id = %id, "Request line is not valid UTF-8");
            return response::write_bad_request(writer).await;
        }
        Err(e) => return Err(e),
    }
    if line.is_empty() {
        // Client connected and went away without sending anything.
        return Ok(());
    }
    // Cap reached without a line terminator: the path is truncated and must
    // not be routed or cached.
    if !line.ends_with('\n') && line.len() as u64 >= MAX_REQUEST_LINE {
        tracing::error!(connection_id = %id, limit = MAX_REQUEST_LINE, "Request line exceeds limit");
        return response::write_bad_request(writer).await;
    }

    let request = match RequestLine::parse(&line) {
        Ok(request) => request,
        Err(e) => {
            tracing::error!(connection_id = %id, error = %e, line = %line.trim_end(), "Couldn't parse request");
            return response::write_bad_request(writer).await;
        }
    };

    tracing::info!(
        connection_id = %id,
        method = %request.method,
        path = %request.path,
        "Received request"
    );

    // Cache first; routing is only consulted on a miss.
    match state.cache.lookup(&request.path).await {
        Ok(Some(hit)) => {
            tracing::info!(connection_id = %id, path = %hit.path().display(), "HIT");
            response::write_success_header(writer).await?;
            if let Err(e) = hit.copy_to(writer).await {
                tracing::error!(connection_id = %id, error = %e, "Cache read failure");
                return Err(e.source);
            }
            return Ok(());
        }
        Ok(None) => {}
        Err(e) => {
            tracing::error!(connection_id = %id, error = %e, "Cache lookup failure");
            return response::write_server_error(writer).await;
        }
    }

    let mirror = match state.router.resolve(&request.path) {
        Some(mirror) => mirror,
        None => {
            tracing::debug!(connection_id = %id, path = %request.path, "No mirror for path, answering with listing");
            return response::write_success(writer, state.router.listing().as_bytes()).await;
        }
    };

    let uri = mirror.upstream_uri(&request.path);
    tracing::info!(connection_id = %id, uri = %uri, "MISS");

    match state.fetcher.fetch(&uri).await {
        Ok(body) => {
            if let Err(e) = state.cache.store(&request.path, &body).await {
                tracing::error!(connection_id = %id, error = %e, "Cache store failure");
                return response::write_server_error(writer).await;
            }
            response::write_success(writer, &body).await
        }
        Err(UpstreamError::Status {
            status,
            reason,
            body,
        }) => {
            tracing::warn!(connection_id = %id, status, uri = %uri, "Upstream failure relayed");
            response::write_upstream_failure(writer, status, &reason, &body).await
        }
        Err(UpstreamError::Transport(e)) => {
            tracing::warn!(connection_id = %id, error = %e, uri = %uri, "Upstream unreachable");
            response::write_upstream_failure(writer, 502, "Bad Gateway", e.to_string().as_bytes())
                .await
        }
    }
}
