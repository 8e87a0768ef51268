//! Connected-address enumeration (spec.md §4.3's `connected_add`/
//! `connected_delete` feed): walks the local interface table for addresses
//! assigned directly to an interface, the set `ConnTable` must know about
//! to decide whether a nexthop is on-link.
//!
//! Platform split mirrors the teacher's route-table crate: netlink on
//! Linux, `GetUnicastIpAddressTable` on Windows. Route enumeration itself
//! is out of scope here — only the connected-address side, which is what
//! spec.md §4.3 actually consumes.

use nht_common::Prefix;
use std::{future::Future, io};
use thiserror::Error;

#[cfg(target_os = "linux")]
pub mod linux;
#[cfg(target_os = "windows")]
pub mod windows_sys;

#[derive(Debug, Error)]
pub enum IfaceError {
    #[error("IO error => {0}")]
    Io(#[from] io::Error),

    #[cfg(target_os = "linux")]
    #[error("Netlink error => {0}")]
    Netlink(#[from] rtnetlink::Error),
    #[cfg(target_os = "windows")]
    #[error("Win32 API error => {0}")]
    Win32(u32),
}

/// One address bound directly to a local interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectedAddress {
    pub interface_index: u32,
    pub prefix: Prefix,
}

/// Platform-agnostic enumerator of connected addresses. `nht-scan`'s
/// interface-housekeeping step calls `all()` once per scan and feeds the
/// result to `ConnTable::connected_add`/`connected_delete` (spec.md §4.3,
/// §4.5).
pub trait ConnectedAddressSource: Sized {
    fn new() -> Result<Self, IfaceError>;
    fn all(&self) -> impl Future<Output = Result<Vec<ConnectedAddress>, IfaceError>> + Send;
}
