//! Transport layer for the remote calculator protocol.
//!
//! Two transports over one shared engine (rcalc-core):
//! - TCP: persistent line-oriented sessions, one task per connection,
//!   tracked in a shared registry so shutdown can reach every live socket
//! - UDP: stateless binary-framed datagrams, strictly one at a time
//!
//! Socket binding and CLI handling live in the `rcalcd` binary; this crate
//! starts from already-bound sockets.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod registry;
pub mod signals;
pub mod tcp;
pub mod udp;

pub use error::{Error, Result};
pub use registry::{ConnectionRegistry, MAX_CLIENTS};
