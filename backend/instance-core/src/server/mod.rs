//! Application server.
//!
//! The coordinator only depends on [`AppServer`]: bind a port, hand back a
//! [`ServerHandle`]. [`RollCallServer`] is the production implementation, an
//! axum router serving the roster UI, its JSON API and the `/ping` handshake.
//!
//! Requests are handled concurrently on the tokio runtime. The handshake
//! handler reads no shared state, so a slow roster request never delays it.

mod handle;
mod routes;

pub use handle::ServerHandle;
pub use routes::{ErrorBody, ROUTES};

use crate::ROLLCALL_SERVER_HOSTNAME;
use crate::error::server::ServerError;
use crate::roster::RosterStore;

use common::ErrorLocation;

use std::future::Future;
use std::panic::Location;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use log::{error, info};
use tokio::net::TcpListener;
use tokio::spawn as TokioSpawn;
use tokio::sync::oneshot;

/// Something the coordinator can start on a chosen port.
pub trait AppServer: Send + Sync {
    /// Bind `127.0.0.1:port` and start serving in the background.
    ///
    /// Must fail with [`ServerError::Bind`] when the port cannot be bound, so
    /// the coordinator can tell a lost race from a broken server.
    fn start(&self, port: u16) -> impl Future<Output = Result<ServerHandle, ServerError>> + Send;
}

pub(crate) struct ServerState {
    pub(crate) roster: RosterStore,
    pub(crate) static_dir: PathBuf,
}

#[derive(Clone)]
pub struct RollCallServer {
    state: Arc<ServerState>,
}

impl RollCallServer {
    pub fn new(roster: RosterStore, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: Arc::new(ServerState {
                roster,
                static_dir: static_dir.into(),
            }),
        }
    }

    pub fn router(&self) -> Router {
        routes::build_router(Arc::clone(&self.state))
    }

    /// Serve on an already bound listener until the handle asks for shutdown.
    #[track_caller]
    pub fn serve(&self, listener: TcpListener) -> Result<ServerHandle, ServerError> {
        let address = listener.local_addr().map_err(|e| ServerError::Serve {
            message: format!("Listener has no local address: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let app = self.router();

        let task = TokioSpawn(async move {
            let result = axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await;

            match &result {
                Ok(()) => info!("Server on {address} stopped"),
                Err(e) => error!("Server on {address} failed: {e}"),
            }

            result
        });

        info!("Serving on http://{address}");
        Ok(ServerHandle::new(address.port(), shutdown_tx, task))
    }
}

impl AppServer for RollCallServer {
    async fn start(&self, port: u16) -> Result<ServerHandle, ServerError> {
        let address = format!("{ROLLCALL_SERVER_HOSTNAME}:{port}");

        let listener = TcpListener::bind(&address)
            .await
            .map_err(|e| ServerError::Bind {
                message: format!("Failed to bind {address}: {e}"),
                port,
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        info!("Listening on {address}");
        self.serve(listener)
    }
}
