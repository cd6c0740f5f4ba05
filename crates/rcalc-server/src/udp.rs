//! UDP transport: synchronous datagram request/response loop.
//!
//! Connectionless and strictly sequential: one datagram is decoded,
//! evaluated, and answered before the next receive is issued. No per-client
//! state survives a datagram and the connection registry is not involved.

use tokio::net::UdpSocket;
use tracing::{debug, warn};

use rcalc_core::error::EvalError;
use rcalc_core::eval::evaluate;
use rcalc_core::frame::{MAX_RESPONSE_SIZE, MSG_MALFORMED, MSG_NEGATIVE, Request, Response};

/// Serve datagrams forever.
///
/// Receive and send failures are logged and the loop keeps going; a
/// malformed datagram earns an error response, never a dropped server.
pub async fn serve(socket: UdpSocket) -> crate::Result<()> {
    let mut buf = [0u8; MAX_RESPONSE_SIZE];
    loop {
        let (len, peer) = match socket.recv_from(&mut buf).await {
            Ok(received) => received,
            Err(e) => {
                warn!(error = %e, "receive failed");
                continue;
            }
        };
        let response = answer(&buf[..len]);
        debug!(peer = %peer, status = ?response.status, "answering datagram");
        if let Err(e) = socket.send_to(&response.encode(), peer).await {
            warn!(peer = %peer, error = %e, "send failed");
        }
    }
}

/// Map one request datagram to its response frame.
fn answer(datagram: &[u8]) -> Response {
    let request = match Request::decode(datagram) {
        Ok(request) => request,
        Err(e) => {
            debug!(error = %e, "request rejected");
            return Response::error(MSG_MALFORMED);
        }
    };
    match evaluate(request.expr) {
        Ok(value) => Response::ok(value),
        Err(EvalError::NegativeResult(value)) => {
            debug!(value, "negative result refused");
            Response::error(MSG_NEGATIVE)
        }
        Err(EvalError::Malformed) => Response::error(MSG_MALFORMED),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rcalc_core::frame::Status;

    #[test]
    fn test_answer_success() {
        let response = answer(&[0x00, 0x01, b'5']);
        assert_eq!(response, Response::ok(5));
        assert_eq!(response.encode(), vec![0x01, 0x00, 0x01, b'5']);
    }

    #[test]
    fn test_answer_frame_errors_use_the_parse_diagnostic() {
        for datagram in [
            &[][..],                 // empty
            &[0x00, 0x01][..],       // too short
            &[0x01, 0x01, b'5'][..], // response opcode
            &[0x00, 0x05, b'5'][..], // length mismatch
        ] {
            let response = answer(datagram);
            assert_eq!(response.status, Status::Error);
            assert_eq!(response.message, MSG_MALFORMED);
        }
    }

    #[test]
    fn test_answer_malformed_expression() {
        let response = answer(&Request { expr: "abc" }.encode());
        assert_eq!(response, Response::error(MSG_MALFORMED));
    }

    #[test]
    fn test_answer_negative_result() {
        let response = answer(&Request { expr: "(- 1 5)" }.encode());
        assert_eq!(response, Response::error(MSG_NEGATIVE));
    }
}
