//! Connection registry shared between session drivers and shutdown.
//!
//! Tracks the write handle of every live stream session so the shutdown
//! path can say goodbye to all of them at once. All mutation goes through a
//! single mutex: register, deregister, and the shutdown sweep are fully
//! serialized, and nothing ever observes a partially-updated map.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use rcalc_core::session::BYE_REPLY;

/// Fixed upper bound on registered sessions.
///
/// Registration past the bound is dropped: the session is still served, it
/// just cannot be reached by the shutdown sweep. A known capacity cliff,
/// not a fatal condition.
pub const MAX_CLIENTS: usize = 100;

/// Identifier the accept loop assigns to each connection.
pub type ConnId = u64;

/// Shared, serialized map of live connections.
///
/// Generic over the write handle so the sweep can be exercised against
/// in-memory streams; the TCP transport instantiates it with
/// [`tokio::net::tcp::OwnedWriteHalf`].
pub struct ConnectionRegistry<W> {
    capacity: usize,
    connections: Mutex<HashMap<ConnId, Arc<Mutex<W>>>>,
}

impl<W> ConnectionRegistry<W> {
    /// Registry bounded at [`MAX_CLIENTS`].
    pub fn new() -> Self {
        Self::with_capacity(MAX_CLIENTS)
    }

    /// Registry with an explicit capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Record a live connection. Returns `false` when the capacity bound
    /// drops the registration.
    pub async fn register(&self, id: ConnId, writer: Arc<Mutex<W>>) -> bool {
        let mut connections = self.connections.lock().await;
        if connections.len() >= self.capacity {
            warn!(
                conn = id,
                capacity = self.capacity,
                "registry full, connection not tracked"
            );
            return false;
        }
        connections.insert(id, writer);
        true
    }

    /// Remove a connection. Returns `false` if it was never tracked or the
    /// shutdown sweep already drained it.
    pub async fn deregister(&self, id: ConnId) -> bool {
        self.connections.lock().await.remove(&id).is_some()
    }

    /// Number of currently tracked connections.
    pub async fn active(&self) -> usize {
        self.connections.lock().await.len()
    }
}

impl<W: AsyncWrite + Unpin> ConnectionRegistry<W> {
    /// Send a final `BYE` to every tracked connection and shut it down.
    ///
    /// The map lock is held for the entire sweep, so no registration or
    /// deregistration can interleave with it; a session deregistering
    /// concurrently blocks until the sweep completes or finds its entry
    /// already gone.
    pub async fn shutdown_all(&self) {
        let mut connections = self.connections.lock().await;
        info!(connections = connections.len(), "closing active sessions");
        for (id, writer) in connections.drain() {
            let mut writer = writer.lock().await;
            if let Err(e) = writer.write_all(BYE_REPLY).await {
                debug!(conn = id, error = %e, "final BYE not delivered");
            }
            let _ = writer.shutdown().await;
        }
    }
}

impl<W> Default for ConnectionRegistry<W> {
    fn default() -> Self {
        Self::new()
    }
}
