//! WebSocket push server
//!
//! Each accepted client becomes a subscriber; every broadcast snapshot is
//! written to it as one text frame. Client messages are read only to
//! notice a close.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, info, warn};

use super::registry::SubscriberRegistry;

/// Handshake deadline for a new client
const ACCEPT_TIMEOUT_SECS: u64 = 10;
/// Write deadline for one frame; a slower client is disconnected
const SEND_TIMEOUT_SECS: u64 = 5;

/// Accepts dashboard clients and streams snapshots to them
#[derive(Debug)]
pub struct PushServer {
    listener: TcpListener,
    registry: Arc<SubscriberRegistry>,
}

impl PushServer {
    /// Binds the listener
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the address cannot be bound.
    pub async fn bind(addr: &str, registry: Arc<SubscriberRegistry>) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, registry })
    }

    /// Address the server listens on
    ///
    /// # Errors
    ///
    /// Returns the I/O error from the socket.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts clients until the task is cancelled
    pub async fn run(self) {
        if let Ok(addr) = self.listener.local_addr() {
            info!(%addr, "Push server listening");
        }
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    let registry = Arc::clone(&self.registry);
                    tokio::spawn(async move {
                        serve_client(stream, peer, registry).await;
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Failed to accept push client");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
            }
        }
    }
}

async fn serve_client(stream: TcpStream, peer: SocketAddr, registry: Arc<SubscriberRegistry>) {
    let handshake =
        tokio::time::timeout(Duration::from_secs(ACCEPT_TIMEOUT_SECS), accept_async(stream)).await;
    let ws_stream = match handshake {
        Ok(Ok(ws)) => ws,
        Ok(Err(e)) => {
            debug!(%peer, error = %e, "WebSocket handshake failed");
            return;
        }
        Err(_) => {
            debug!(%peer, "WebSocket handshake timed out");
            return;
        }
    };

    let (id, mut queue) = registry.register();
    info!(%peer, subscriber = %id, subscribers = registry.len(), "Push client connected");
    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let writer = async {
        while let Some(payload) = queue.recv().await {
            let send = ws_sender.send(Message::Text(payload.to_string()));
            match tokio::time::timeout(Duration::from_secs(SEND_TIMEOUT_SECS), send).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    debug!(subscriber = %id, error = %e, "WebSocket send failed");
                    break;
                }
                Err(_) => {
                    warn!(subscriber = %id, "WebSocket send timed out, disconnecting");
                    break;
                }
            }
        }
    };

    let reader = async {
        while let Some(message) = ws_receiver.next().await {
            match message {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(e) => {
                    debug!(subscriber = %id, error = %e, "WebSocket receive error");
                    break;
                }
            }
        }
    };

    tokio::select! {
        () = writer => {}
        () = reader => {}
    }

    registry.deregister(id);
    info!(%peer, subscriber = %id, "Push client disconnected");
}
