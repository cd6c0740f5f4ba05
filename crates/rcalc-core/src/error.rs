//! Error types for protocol operations.

use thiserror::Error;

/// Expression evaluation errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum EvalError {
    /// Grammar violation, trailing garbage, or a division by zero that
    /// halted the fold.
    #[error("Could not parse expression")]
    Malformed,

    /// The expression parsed, but the final value is below zero.
    #[error("Expression evaluates to a negative result ({0})")]
    NegativeResult(i64),
}

/// Frame decoding errors for the datagram transport.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Frame shorter than the fixed minimum.
    #[error("Frame too short: {0} bytes")]
    TooShort(usize),

    /// First byte is not the expected opcode.
    #[error("Unexpected opcode: 0x{0:02X}")]
    WrongOpcode(u8),

    /// Declared payload length disagrees with the received byte count.
    #[error("Length mismatch: declared {declared}, received {received}")]
    LengthMismatch {
        /// Value of the length byte.
        declared: usize,
        /// Bytes actually received past the header.
        received: usize,
    },

    /// Unknown status byte in a response frame.
    #[error("Unknown status: 0x{0:02X}")]
    UnknownStatus(u8),

    /// Payload is not valid UTF-8 text.
    #[error("Payload is not valid UTF-8")]
    InvalidPayload,
}

/// Session buffer errors for the stream transport.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// Receive buffer reached capacity without a line terminator.
    #[error("Receive buffer overflow")]
    BufferOverflow,
}
