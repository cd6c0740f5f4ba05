//! TCP transport: accept loop and per-connection session driver.
//!
//! One task per accepted connection. The task owns the read half, the
//! receive buffer, and the state machine exclusively; only the write half
//! is shared, mutex-guarded, with the connection registry so the shutdown
//! sweep can reach it.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use rcalc_core::frame::MAX_RESPONSE_SIZE;
use rcalc_core::session::{Action, BYE_REPLY, Session};

use crate::registry::{ConnId, ConnectionRegistry};

/// Registry instantiation used by the TCP transport.
pub type TcpRegistry = ConnectionRegistry<OwnedWriteHalf>;

/// Accept connections forever, spawning one driver task per connection.
///
/// Accept failures are logged and the loop keeps going; they never bring
/// the server down. Only the termination signal ends TCP service.
pub async fn serve(listener: TcpListener, registry: Arc<TcpRegistry>) -> crate::Result<()> {
    let mut next_id: ConnId = 0;
    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!(error = %e, "accept failed");
                continue;
            }
        };
        let id = next_id;
        next_id = next_id.wrapping_add(1);
        debug!(conn = id, peer = %peer, "accepted connection");
        tokio::spawn(handle_connection(id, stream, Arc::clone(&registry)));
    }
}

/// Drive one session from accept to close.
async fn handle_connection(id: ConnId, stream: TcpStream, registry: Arc<TcpRegistry>) {
    let (mut reader, writer) = stream.into_split();
    let writer = Arc::new(Mutex::new(writer));
    registry.register(id, Arc::clone(&writer)).await;

    let mut session = Session::new();
    drive_session(&mut session, &mut reader, &writer).await;

    // Terminal path: one unconditional best-effort BYE, then close. The
    // writer lock is released before deregistering so the lock order never
    // inverts against the shutdown sweep.
    {
        let mut writer = writer.lock().await;
        let _ = writer.write_all(BYE_REPLY).await;
        let _ = writer.shutdown().await;
    }
    registry.deregister(id).await;
    debug!(conn = id, "session closed");
}

/// Receive, buffer, and answer lines until the state machine terminates.
///
/// Each line is fully handled, its reply written, before the next buffered
/// line is looked at.
async fn drive_session(
    session: &mut Session,
    reader: &mut OwnedReadHalf,
    writer: &Arc<Mutex<OwnedWriteHalf>>,
) {
    let mut chunk = [0u8; MAX_RESPONSE_SIZE];
    loop {
        while let Some(line) = session.next_line() {
            let reply = match session.on_line(&line) {
                Action::Reply(reply) | Action::ReplyAndClose(reply) => Some(reply),
                Action::Close => None,
            };
            if let Some(reply) = reply {
                let mut writer = writer.lock().await;
                if let Err(e) = writer.write_all(&reply).await {
                    debug!(error = %e, "reply write failed");
                    session.terminate();
                }
            }
            if session.is_terminated() {
                return;
            }
        }

        if session.is_full() {
            // Capacity reached without a line terminator.
            debug!("receive buffer full without a complete line");
            session.terminate();
            return;
        }

        let free = session.remaining().min(chunk.len());
        match reader.read(&mut chunk[..free]).await {
            // Peer closed the connection.
            Ok(0) => {
                session.terminate();
                return;
            }
            Ok(n) => {
                if session.push(&chunk[..n]).is_err() {
                    return;
                }
            }
            Err(e) => {
                debug!(error = %e, "receive failed");
                session.terminate();
                return;
            }
        }
    }
}
