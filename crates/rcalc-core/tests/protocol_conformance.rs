//! Wire format and session protocol conformance tests.
//!
//! Verifies exact byte layouts of the datagram frames and the full command
//! vocabulary of the stream session, independent of any socket.

use rcalc_core::error::{EvalError, FrameError};
use rcalc_core::eval::evaluate;
use rcalc_core::frame::{
    MAX_RESPONSE_SIZE, MIN_REQUEST_SIZE, MSG_MALFORMED, MSG_NEGATIVE, OPCODE_REQUEST,
    OPCODE_RESPONSE, Request, Response, Status,
};
use rcalc_core::session::{Action, BYE_REPLY, HELLO_REPLY, Session, SessionState};

/// Request format: `[0x00][length][payload]` with length = total - 2.
#[test]
fn conformance_request_format() {
    let frame = Request { expr: "(+ 2 3)" };
    let bytes = frame.encode();

    assert_eq!(bytes[0], OPCODE_REQUEST, "first byte must be the request opcode");
    assert_eq!(
        bytes[1] as usize,
        bytes.len() - 2,
        "length byte must cover exactly the payload"
    );
    assert_eq!(&bytes[2..], b"(+ 2 3)", "payload must be the raw expression");

    assert_eq!(Request::decode(&bytes), Ok(frame));
}

/// Response format: `[0x01][status][length][message]`.
#[test]
fn conformance_response_format() {
    let bytes = Response::ok(42).encode();

    assert_eq!(bytes[0], OPCODE_RESPONSE, "first byte must be the response opcode");
    assert_eq!(bytes[1], Status::Ok.to_u8(), "second byte must be the status");
    assert_eq!(bytes[2] as usize, 2, "length byte must cover the message");
    assert_eq!(&bytes[3..], b"42", "message must be the decimal result");
}

/// The minimum request is two header bytes plus one payload byte.
#[test]
fn conformance_minimum_request_size() {
    assert_eq!(MIN_REQUEST_SIZE, 3);
    assert!(Request::decode(&[0x00, 0x00]).is_err());
    assert!(Request::decode(&[0x00, 0x01, b'1']).is_ok());
}

/// Every header violation is rejected with the matching error, and none of
/// them panics.
#[test]
fn conformance_request_rejections() {
    assert!(matches!(
        Request::decode(&[0x02, 0x01, b'5']),
        Err(FrameError::WrongOpcode(0x02))
    ));
    assert!(matches!(
        Request::decode(&[0x00, 0x03, b'5']),
        Err(FrameError::LengthMismatch {
            declared: 3,
            received: 1
        })
    ));
    assert!(matches!(
        Request::decode(&[0x00]),
        Err(FrameError::TooShort(1))
    ));
}

/// Fixed diagnostics are stable wire artifacts, not implementation detail.
#[test]
fn conformance_diagnostic_strings() {
    assert_eq!(MSG_MALFORMED, "Could not parse message");
    assert_eq!(
        MSG_NEGATIVE,
        "Server does not support negative expression evaluations"
    );
}

/// Left-to-right n-ary fold with truncating division, as a reference
/// evaluator over the same semantics would compute it.
#[test]
fn conformance_fold_reference_values() {
    let cases: &[(&str, i64)] = &[
        ("5", 5),
        ("(+ 1 2 3)", 6),
        ("(* (+ 1 2) 4)", 12),
        ("(- 3)", 3),
        ("(- 10 1 2 3)", 4),
        ("(/ 100 3 3)", 11),
        ("(+ 0 0)", 0),
    ];
    for &(expr, expected) in cases {
        assert_eq!(evaluate(expr), Ok(expected), "expr {expr:?}");
    }
}

#[test]
fn conformance_fold_failures() {
    assert_eq!(evaluate("(/ 7 0)"), Err(EvalError::Malformed));
    assert_eq!(evaluate("abc"), Err(EvalError::Malformed));
    assert!(matches!(
        evaluate("(- 2 3)"),
        Err(EvalError::NegativeResult(-1))
    ));
}

/// Full happy-path transcript: greeting, several solves, client farewell.
#[test]
fn conformance_session_transcript() {
    let mut session = Session::new();
    assert_eq!(session.state(), SessionState::AwaitHello);

    session.push(b"HELLO\nSOLVE (+ 2 3)\nSOLVE 7\nBYE\n").expect("push failed");

    let line = session.next_line().expect("missing line");
    assert_eq!(session.on_line(&line), Action::Reply(HELLO_REPLY.to_vec()));

    let line = session.next_line().expect("missing line");
    assert_eq!(session.on_line(&line), Action::Reply(b"RESULT 5\n".to_vec()));

    let line = session.next_line().expect("missing line");
    assert_eq!(session.on_line(&line), Action::Reply(b"RESULT 7\n".to_vec()));

    let line = session.next_line().expect("missing line");
    assert_eq!(session.on_line(&line), Action::Close);
    assert!(session.is_terminated());
}

/// A failed solve answers BYE itself; the driver's terminate path adds the
/// unconditional farewell on top.
#[test]
fn conformance_session_failure_transcript() {
    let mut session = Session::new();
    session.push(b"HELLO\nSOLVE (/ 1 0)\n").expect("push failed");

    let line = session.next_line().expect("missing line");
    session.on_line(&line);

    let line = session.next_line().expect("missing line");
    assert_eq!(
        session.on_line(&line),
        Action::ReplyAndClose(BYE_REPLY.to_vec())
    );
    assert!(session.is_terminated());
}

/// The shared size bound keeps expressions, buffers, and responses finite.
#[test]
fn conformance_size_bound() {
    assert_eq!(MAX_RESPONSE_SIZE, 1024);
    let mut session = Session::new();
    assert_eq!(session.remaining(), MAX_RESPONSE_SIZE);
    session.push(&[b'9'; 10]).expect("push failed");
    assert_eq!(session.remaining(), MAX_RESPONSE_SIZE - 10);
}
