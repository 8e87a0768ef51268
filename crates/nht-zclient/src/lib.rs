//! `ZLookup`: the synchronous-per-call request/response client that talks
//! to the routing daemon over [`nht-wire`]'s framing (spec.md §4.2). Owns
//! the socket, the read/write buffers, and the reconnect state; every
//! public method degrades to the "oracle unavailable" result documented in
//! spec.md §7 rather than propagating an error, so `Scanner`/`Importer`
//! never need to special-case a down daemon.

pub mod client;
pub mod endpoint;
pub mod oracle;

pub use client::{ImportCheck, Resolution, ZClientConfig, ZLookup};
pub use endpoint::Endpoint;
pub use oracle::NexthopOracle;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ZClientError {
    #[error("not connected")]
    NotConnected,
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Wire(#[from] nht_wire::WireError),
    #[error("daemon replied with unexpected command {0}")]
    UnexpectedCommand(u16),
}
