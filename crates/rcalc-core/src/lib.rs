//! Core protocol engine for the remote calculator protocol.
//!
//! Implements the transport-independent pieces shared by the TCP and UDP
//! servers:
//! - Prefix-notation expression parsing and evaluation
//! - Request/response frame codec for the datagram transport
//! - Line-oriented session state machine for the stream transport
//!
//! All I/O lives in rcalc-server; this crate is pure logic.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod eval;
pub mod frame;
pub mod session;

pub use error::{EvalError, FrameError, SessionError};
pub use eval::evaluate;
pub use frame::{MAX_RESPONSE_SIZE, Request, Response, Status};
pub use session::{Action, Session, SessionState};
