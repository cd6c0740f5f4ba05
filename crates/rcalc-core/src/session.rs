//! Line-oriented session state machine for the stream transport.
//!
//! One session exists per accepted connection. The transport driver feeds
//! received bytes in with [`Session::push`], drains complete lines with
//! [`Session::next_line`], and hands each line to [`Session::on_line`],
//! writing whatever reply the returned [`Action`] carries before touching
//! the next buffered line. States move `AwaitHello` to `AwaitSolve` to
//! `Terminated`; nothing ever returns to `AwaitHello`.
//!
//! The machine performs no I/O. The driver owes two things on termination:
//! a best-effort final `BYE` (unconditional, idempotent from the client's
//! point of view) and deregistration from the connection registry.

use crate::error::SessionError;
use crate::eval::evaluate;
use crate::frame::MAX_RESPONSE_SIZE;

/// Opening line a client must send first.
const HELLO: &[u8] = b"HELLO";

/// Line closing a session from the client side.
const BYE: &[u8] = b"BYE";

/// Prefix of an evaluation request line.
const SOLVE_PREFIX: &[u8] = b"SOLVE ";

/// Greeting reply confirming a session is open.
pub const HELLO_REPLY: &[u8] = b"HELLO\n";

/// Farewell sent on every termination path.
pub const BYE_REPLY: &[u8] = b"BYE\n";

/// Protocol position of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the opening `HELLO`.
    AwaitHello,
    /// Greeted; serving `SOLVE` round-trips.
    AwaitSolve,
    /// Terminal. The driver sends the final `BYE` and closes.
    Terminated,
}

/// What the driver must do after a line is handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send the payload and keep the session open.
    Reply(Vec<u8>),
    /// Send the payload, then close the connection.
    ReplyAndClose(Vec<u8>),
    /// Close the connection without a state-machine reply.
    Close,
}

/// Per-connection receive buffer and state machine.
#[derive(Debug)]
pub struct Session {
    state: SessionState,
    buf: Vec<u8>,
}

impl Session {
    /// Fresh session in `AwaitHello` with an empty buffer.
    pub fn new() -> Self {
        Self {
            state: SessionState::AwaitHello,
            buf: Vec::with_capacity(MAX_RESPONSE_SIZE),
        }
    }

    /// Current protocol state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Whether the terminal state has been reached.
    pub fn is_terminated(&self) -> bool {
        self.state == SessionState::Terminated
    }

    /// Force the terminal state (peer close, transport error, overflow).
    pub fn terminate(&mut self) {
        self.state = SessionState::Terminated;
    }

    /// Free buffer capacity; the driver must not read more than this.
    pub fn remaining(&self) -> usize {
        MAX_RESPONSE_SIZE - self.buf.len()
    }

    /// True once the buffer is full. With no complete line buffered the
    /// session cannot make progress and must terminate.
    pub fn is_full(&self) -> bool {
        self.buf.len() >= MAX_RESPONSE_SIZE
    }

    /// Append received bytes, bounded by the fixed capacity.
    pub fn push(&mut self, data: &[u8]) -> Result<(), SessionError> {
        if data.len() > self.remaining() {
            self.state = SessionState::Terminated;
            return Err(SessionError::BufferOverflow);
        }
        self.buf.extend_from_slice(data);
        Ok(())
    }

    /// Pop the next complete line, terminator stripped. Unconsumed trailing
    /// bytes stay buffered for the next receive.
    pub fn next_line(&mut self) -> Option<Vec<u8>> {
        let newline = self.buf.iter().position(|&byte| byte == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=newline).collect();
        line.pop();
        Some(line)
    }

    /// Drive the state machine with one complete line.
    pub fn on_line(&mut self, line: &[u8]) -> Action {
        match self.state {
            SessionState::AwaitHello => {
                if line == HELLO {
                    self.state = SessionState::AwaitSolve;
                    Action::Reply(HELLO_REPLY.to_vec())
                } else {
                    self.state = SessionState::Terminated;
                    Action::Close
                }
            }
            SessionState::AwaitSolve => self.on_solve_line(line),
            SessionState::Terminated => Action::Close,
        }
    }

    fn on_solve_line(&mut self, line: &[u8]) -> Action {
        if line == BYE {
            self.state = SessionState::Terminated;
            return Action::Close;
        }
        let Some(expr) = line.strip_prefix(SOLVE_PREFIX) else {
            self.state = SessionState::Terminated;
            return Action::Close;
        };
        let result = core::str::from_utf8(expr)
            .ok()
            .and_then(|expr| evaluate(expr).ok());
        match result {
            Some(value) => Action::Reply(format!("RESULT {value}\n").into_bytes()),
            None => {
                // Failure and negative result look the same on this
                // transport.
                self.state = SessionState::Terminated;
                Action::ReplyAndClose(BYE_REPLY.to_vec())
            }
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
