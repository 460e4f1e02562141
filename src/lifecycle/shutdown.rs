//! Stop signal shared by the HTTP server and the signal task.
//!
//! `main` hands one receiver to `HttpServer::run`; the signal task holds a
//! clone and fires it on SIGINT/SIGTERM. Integration tests fire it when a
//! test service is dropped.

use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Receiver that resolves once `trigger` is called.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Stop every subscribed server. A server that already exited is not
    /// an error.
    pub fn trigger(&self) {
        match self.tx.send(()) {
            Ok(servers) => tracing::debug!(servers, "Stop signal sent"),
            Err(_) => tracing::debug!("Stop signal sent with no server listening"),
        }
    }

    /// Servers still waiting for the stop signal.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
