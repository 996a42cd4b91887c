//! TCP relay server.
//!
//! One tokio task per connection reads newline-delimited JSON client
//! messages and feeds them to the shared hub. Each peer also gets a writer
//! task draining its own unbounded channel, so a slow socket never blocks the
//! hub lock.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::hub::{Outbound, PeerId, RelayHub};
use crate::protocol::{encode_line, ClientMessage, ServerMessage};

/// Errors surfaced by the relay transport.
#[derive(Debug)]
pub enum RelayError {
    Io(std::io::Error),
    Json(serde_json::Error),
    /// The peer's outbound channel is gone.
    Closed,
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelayError::Io(e) => write!(f, "relay io error: {e}"),
            RelayError::Json(e) => write!(f, "relay json error: {e}"),
            RelayError::Closed => write!(f, "relay channel closed"),
        }
    }
}

impl std::error::Error for RelayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RelayError::Io(e) => Some(e),
            RelayError::Json(e) => Some(e),
            RelayError::Closed => None,
        }
    }
}

impl From<std::io::Error> for RelayError {
    fn from(e: std::io::Error) -> Self {
        RelayError::Io(e)
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(e: serde_json::Error) -> Self {
        RelayError::Json(e)
    }
}

/// Hub plus the delivery channel of every connected peer.
struct Shared {
    hub: RelayHub,
    peers: HashMap<PeerId, mpsc::UnboundedSender<ServerMessage>>,
    next_peer: PeerId,
}

impl Shared {
    fn dispatch(&self, outbound: Vec<Outbound>) {
        for Outbound { peer, message } in outbound {
            match self.peers.get(&peer) {
                Some(tx) => {
                    if tx.send(message).is_err() {
                        debug!(peer, "dropping message for closed peer");
                    }
                }
                None => debug!(peer, "no channel for peer"),
            }
        }
    }
}

pub struct RelayServer {
    listener: TcpListener,
    shared: Arc<Mutex<Shared>>,
}

impl RelayServer {
    /// Bind the listener. `seed` drives the hub's wave seed stream.
    pub async fn bind(addr: impl ToSocketAddrs, seed: u64) -> Result<Self, RelayError> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self {
            listener,
            shared: Arc::new(Mutex::new(Shared {
                hub: RelayHub::new(seed),
                peers: HashMap::new(),
                next_peer: 1,
            })),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, RelayError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the listener fails.
    pub async fn run(self) -> Result<(), RelayError> {
        info!(addr = ?self.listener.local_addr().ok(), "relay listening");
        loop {
            let (stream, addr) = self.listener.accept().await?;
            let shared = Arc::clone(&self.shared);
            tokio::spawn(async move {
                if let Err(e) = serve_peer(stream, shared).await {
                    warn!(%addr, error = %e, "peer session ended with error");
                }
            });
        }
    }
}

async fn serve_peer(stream: TcpStream, shared: Arc<Mutex<Shared>>) -> Result<(), RelayError> {
    let (reader, mut writer) = stream.into_split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    let peer = {
        let mut guard = shared.lock().await;
        let peer = guard.next_peer;
        guard.next_peer += 1;
        guard.peers.insert(peer, tx.clone());
        peer
    };
    info!(peer, "peer connected");

    let writer_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let line = encode_line(&message)?;
            writer.write_all(line.as_bytes()).await?;
        }
        Ok::<(), RelayError>(())
    });

    let result = read_loop(peer, reader, &tx, &shared).await;

    {
        let mut guard = shared.lock().await;
        let outbound = guard.hub.disconnect(peer);
        guard.dispatch(outbound);
        guard.peers.remove(&peer);
    }
    drop(tx);
    info!(peer, "peer disconnected");

    match writer_task.await {
        Ok(Err(e)) => debug!(peer, error = %e, "writer stopped"),
        Err(e) => debug!(peer, error = %e, "writer task failed"),
        Ok(Ok(())) => {}
    }
    result
}

async fn read_loop(
    peer: PeerId,
    reader: tokio::net::tcp::OwnedReadHalf,
    tx: &mpsc::UnboundedSender<ServerMessage>,
    shared: &Arc<Mutex<Shared>>,
) -> Result<(), RelayError> {
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<ClientMessage>(&line) {
            Ok(message) => {
                debug!(peer, ?message, "client message");
                let mut guard = shared.lock().await;
                let outbound = guard.hub.handle(peer, message);
                guard.dispatch(outbound);
            }
            Err(e) => {
                warn!(peer, error = %e, "malformed client message");
                tx.send(ServerMessage::Error {
                    message: format!("malformed message: {e}"),
                })
                .map_err(|_| RelayError::Closed)?;
            }
        }
    }
    Ok(())
}
