//! Wire codec for the request/response protocol spoken to the routing
//! daemon (`ZWire` in spec.md §4.1): a length-prefixed, versioned framing
//! with four recognised commands (IPv4/IPv6 nexthop lookup, IPv4 import
//! lookup, IPv4 recursive-gate verify).
//!
//! All multi-byte integers are big-endian. IPv4 addresses are 4 bytes;
//! IPv6 addresses are 16 bytes. Framing contracts live in [`header`] and
//! [`message`]; the polymorphic nexthop payload lives in [`nexthop`].

pub mod header;
pub mod message;
pub mod nexthop;

pub use header::{MessageHeader, HEADER_SIZE, ZSERV_MARKER, ZSERV_VERSION};
pub use message::{Command, RGateRecord, VerifyDesyncRecord};
pub use nexthop::NextHop;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },
    #[error("bad marker byte: expected {expected:#x}, got {got:#x}")]
    BadMarker { expected: u8, got: u8 },
    #[error("unsupported protocol version: expected {expected}, got {got}")]
    BadVersion { expected: u8, got: u8 },
    #[error("malformed message body: {0}")]
    Malformed(String),
    #[error("message body too large to frame ({0} bytes)")]
    TooLarge(usize),
}

/// Encodes a value that can appear as a [`WireCodec`] body, i.e. round-trips
/// through `nom` on decode and a plain byte-appender on encode. Mirrors the
/// teacher codec's `pack`/`unpack` pair (`BGPElement` in the BGP wire
/// crate), renamed for this protocol and changed to append into a caller
/// owned buffer rather than allocate per call.
pub trait WireCodec: Sized {
    fn decode(input: &[u8]) -> nom::IResult<&[u8], Self>;
    fn encode(&self, buf: &mut Vec<u8>);
}
