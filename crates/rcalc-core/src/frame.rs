//! Request/response frame codec for the datagram transport.
//!
//! Wire formats (every integer field is a single byte, so byte order never
//! comes into play):
//!
//! ```text
//! request:  [opcode 0x00][length][payload: length bytes]
//! response: [opcode 0x01][status][length][message: length bytes]
//! ```
//!
//! The request payload is the raw expression text, no terminator required.
//! The response message is either the decimal result (status 0x00) or one
//! of the fixed diagnostics (status 0x01).

use crate::error::FrameError;

/// Opcode tagging a request frame.
pub const OPCODE_REQUEST: u8 = 0x00;

/// Opcode tagging a response frame.
pub const OPCODE_RESPONSE: u8 = 0x01;

/// Smallest well-formed request: two header bytes plus one payload byte.
pub const MIN_REQUEST_SIZE: usize = 3;

/// Upper bound on buffered input and output, shared with the stream
/// transport's per-session receive buffer.
pub const MAX_RESPONSE_SIZE: usize = 1024;

/// Diagnostic for frames or expressions that fail to parse.
pub const MSG_MALFORMED: &str = "Could not parse message";

/// Diagnostic for expressions that evaluate below zero.
pub const MSG_NEGATIVE: &str = "Server does not support negative expression evaluations";

/// Response status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    /// Evaluation succeeded; the message is the decimal result.
    Ok = 0x00,
    /// Decoding or evaluation failed; the message is a diagnostic.
    Error = 0x01,
}

impl Status {
    /// Convert to wire format.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Convert from wire format.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x00 => Some(Self::Ok),
            0x01 => Some(Self::Error),
            _ => None,
        }
    }
}

/// A request frame borrowing the datagram's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request<'a> {
    /// Expression text carried by the frame.
    pub expr: &'a str,
}

impl<'a> Request<'a> {
    /// Decode a request frame.
    ///
    /// Rejects frames shorter than [`MIN_REQUEST_SIZE`], frames whose first
    /// byte is not the request opcode, and frames whose length byte does
    /// not equal the received size minus the two header bytes.
    pub fn decode(data: &'a [u8]) -> Result<Self, FrameError> {
        if data.len() < MIN_REQUEST_SIZE {
            return Err(FrameError::TooShort(data.len()));
        }
        if data[0] != OPCODE_REQUEST {
            return Err(FrameError::WrongOpcode(data[0]));
        }
        let declared = data[1] as usize;
        let received = data.len() - 2;
        if declared != received {
            return Err(FrameError::LengthMismatch { declared, received });
        }
        let expr = core::str::from_utf8(&data[2..]).map_err(|_| FrameError::InvalidPayload)?;
        Ok(Self { expr })
    }

    /// Serialize a request frame. Used by clients and tests; the server
    /// only decodes requests.
    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.expr.len() <= u8::MAX as usize);
        let mut buf = Vec::with_capacity(2 + self.expr.len());
        buf.push(OPCODE_REQUEST);
        buf.push(self.expr.len() as u8);
        buf.extend_from_slice(self.expr.as_bytes());
        buf
    }
}

/// A response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Outcome of the request.
    pub status: Status,
    /// Decimal result or diagnostic text.
    pub message: String,
}

impl Response {
    /// Successful response carrying the decimal result.
    ///
    /// The value is never negative; negative results are routed to the
    /// error path before a response is built.
    pub fn ok(value: i64) -> Self {
        debug_assert!(value >= 0);
        Self {
            status: Status::Ok,
            message: value.to_string(),
        }
    }

    /// Error response carrying a diagnostic.
    pub fn error(message: &str) -> Self {
        Self {
            status: Status::Error,
            message: message.to_owned(),
        }
    }

    /// Serialize a response frame.
    ///
    /// Every message the server produces is a short decimal or one of the
    /// fixed diagnostics, all well under the 1-byte length field; an
    /// oversized message is a bug, not a runtime condition, so no
    /// truncation is attempted.
    pub fn encode(&self) -> Vec<u8> {
        debug_assert!(self.message.len() <= u8::MAX as usize);
        let mut buf = Vec::with_capacity(3 + self.message.len());
        buf.push(OPCODE_RESPONSE);
        buf.push(self.status.to_u8());
        buf.push(self.message.len() as u8);
        buf.extend_from_slice(self.message.as_bytes());
        buf
    }

    /// Decode a response frame. Used by clients and tests.
    pub fn decode(data: &[u8]) -> Result<Self, FrameError> {
        if data.len() < 3 {
            return Err(FrameError::TooShort(data.len()));
        }
        if data[0] != OPCODE_RESPONSE {
            return Err(FrameError::WrongOpcode(data[0]));
        }
        let status = Status::from_u8(data[1]).ok_or(FrameError::UnknownStatus(data[1]))?;
        let declared = data[2] as usize;
        let received = data.len() - 3;
        if declared != received {
            return Err(FrameError::LengthMismatch { declared, received });
        }
        let message = core::str::from_utf8(&data[3..])
            .map_err(|_| FrameError::InvalidPayload)?
            .to_owned();
        Ok(Self { status, message })
    }
}
