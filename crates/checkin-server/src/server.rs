//! Axum router, server startup and shutdown.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use checkin_core::{CheckIn, ClientEntry};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::ServeFile;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::ServerConfig;
use crate::connection::WsConnection;
use crate::error::ServerError;
use crate::query::QuerySurface;
use crate::registry::ConnectionRegistry;
use crate::session::SessionContext;
use crate::store::CheckInStore;

/// Shared application state passed to Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub queries: QuerySurface,
    pub sessions: SessionContext,
}

impl AppState {
    /// Build the registry and store once and wire both sides to them.
    pub fn new(config: &ServerConfig) -> Self {
        let registry = Arc::new(ConnectionRegistry::new());
        let store = Arc::new(CheckInStore::new());
        Self {
            queries: QuerySurface::new(Arc::clone(&registry), Arc::clone(&store)),
            sessions: SessionContext::new(registry, store, config),
        }
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState, index_path: &Path) -> Router {
    with_http_layers(routes(index_path).with_state(state))
}

fn routes(index_path: &Path) -> Router<AppState> {
    Router::new()
        .route_service("/", ServeFile::new(index_path))
        .route("/ws", get(ws_handler))
        .route("/clients", get(clients_handler))
        .route("/check-ins", get(check_ins_handler))
}

/// Request tracing, and a 500 instead of a torn-down process when a handler
/// panics. Requires the unwinding panic strategy.
fn with_http_layers(router: Router) -> Router {
    router
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
}

/// Bind the listener and serve in a background task.
pub async fn start(config: ServerConfig) -> Result<ServerHandle, ServerError> {
    let state = AppState::new(&config);
    let queries = state.queries.clone();
    let record_id = state.sessions.store.record_id();
    let router = build_router(state, &config.index_path);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    let local_addr = listener.local_addr()?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    let server = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router)
            .with_graceful_shutdown(signal.cancelled_owned())
            .await
        {
            error!(error = %e, "server stopped with error");
        }
    });

    info!(addr = %local_addr, check_in_id = %record_id, "check-in server started");

    Ok(ServerHandle {
        addr: local_addr,
        queries,
        shutdown,
        server,
    })
}

/// Handle returned by `start()`.
pub struct ServerHandle {
    addr: SocketAddr,
    queries: QuerySurface,
    shutdown: CancellationToken,
    server: JoinHandle<()>,
}

impl ServerHandle {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> &QuerySurface {
        &self.queries
    }

    /// Stop accepting connections. Sessions already running end on their
    /// own receive failure or timeout.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Wait for the serve task to finish.
    pub async fn join(self) {
        if let Err(e) = self.server.await {
            warn!(error = %e, "server task did not finish cleanly");
        }
    }
}

/// GET /ws
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_failed_upgrade(|e| warn!(error = %e, "websocket upgrade failed"))
        .on_upgrade(move |socket| async move {
            let _end = state.sessions.run(WsConnection::new(socket)).await;
        })
}

/// GET /clients
async fn clients_handler(State(state): State<AppState>) -> Json<Vec<ClientEntry>> {
    Json(state.queries.list_connections())
}

/// GET /check-ins
async fn check_ins_handler(State(state): State<AppState>) -> Json<Vec<CheckIn>> {
    Json(state.queries.list_state())
}
