use crate::error::server::ServerError;

use common::ErrorLocation;

use std::io::Result as IoResult;
use std::panic::Location;

use log::debug;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// Handle to a running application server.
///
/// Dropping the handle also drops the shutdown sender, which the server
/// treats as a shutdown request. Keep it alive for as long as the instance
/// should serve.
pub struct ServerHandle {
    port: u16,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<IoResult<()>>,
}

impl ServerHandle {
    pub(crate) fn new(
        port: u16,
        shutdown_tx: oneshot::Sender<()>,
        task: JoinHandle<IoResult<()>>,
    ) -> Self {
        Self {
            port,
            shutdown_tx: Some(shutdown_tx),
            task,
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Ask the server to stop accepting connections and drain in-flight requests.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            debug!("Requesting graceful shutdown of server on port {}", self.port);
            let _ = tx.send(());
        }
    }

    /// Wait for the server task to finish.
    ///
    /// Must not be awaited again once it has returned.
    pub async fn stopped(&mut self) -> Result<(), ServerError> {
        match (&mut self.task).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(ServerError::Serve {
                message: format!("Server on port {} failed: {e}", self.port),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            }),
            Err(e) => Err(ServerError::Task {
                message: format!("Server task on port {} ended abnormally: {e}", self.port),
                location: ErrorLocation::from(Location::caller()),
            }),
        }
    }
}
