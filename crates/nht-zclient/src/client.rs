//! The `ZLookup` client itself (spec.md §4.2, §7): one connection, four
//! request/response operations, and degrade-on-failure semantics so a down
//! daemon never crashes or blocks a caller — it just makes the oracle look
//! unreachable until the next reconnect attempt succeeds.

use crate::endpoint::Endpoint;
use crate::ZClientError;
use nht_wire::header::HEADER_SIZE;
use nht_wire::message::{
    decode_body, encode_framed, Command, ImportLookupQuery, ImportLookupResponse,
    Ipv4LookupQuery, Ipv4LookupResponse, Ipv6LookupQuery, Ipv6LookupResponse, RGateVerifyQuery,
    RGateVerifyResponse, VerifyDesyncRecord,
};
use nht_wire::{MessageHeader, NextHop};
use std::net::{Ipv4Addr, Ipv6Addr};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
#[cfg(unix)]
use tokio::net::UnixStream;
use tokio::net::TcpStream;

enum Conn {
    #[cfg(unix)]
    Unix(UnixStream),
    Tcp(TcpStream),
}

impl Conn {
    async fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        match self {
            #[cfg(unix)]
            Conn::Unix(s) => s.write_all(buf).await,
            Conn::Tcp(s) => s.write_all(buf).await,
        }
    }

    async fn read_exact(&mut self, buf: &mut [u8]) -> std::io::Result<()> {
        match self {
            #[cfg(unix)]
            Conn::Unix(s) => s.read_exact(buf).await.map(|_| ()),
            Conn::Tcp(s) => s.read_exact(buf).await.map(|_| ()),
        }
    }
}

/// A resolved nexthop set, as returned by `resolve_v4`/`resolve_v6` —
/// deliberately independent of `nht-rib`'s `NexthopCacheEntry` so this
/// crate never has to depend back on the cache crate; the scanner converts
/// one into the other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub metric: u32,
    pub nexthops: Vec<NextHop>,
}

/// The result of an import-lookup, spec.md §4.7: whether the route is
/// still reachable, its IGP metric, and the nexthop to install. When the
/// socket is unavailable the oracle is optimistic — `active = true`,
/// `metric = 0`, `nexthop = UNSPECIFIED` — so a daemon outage never causes
/// a previously imported static route to be withdrawn (spec.md §7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportCheck {
    pub active: bool,
    pub metric: u32,
    pub nexthop: Ipv4Addr,
}

impl ImportCheck {
    fn oracle_unavailable() -> Self {
        Self {
            active: true,
            metric: 0,
            nexthop: Ipv4Addr::UNSPECIFIED,
        }
    }
}

/// Connection configuration: where the daemon listens, and how long to
/// wait between reconnect attempts once the socket has gone down.
#[derive(Debug, Clone)]
pub struct ZClientConfig {
    pub endpoint: Endpoint,
    pub reconnect_interval: std::time::Duration,
}

pub struct ZLookup {
    config: ZClientConfig,
    conn: Option<Conn>,
}

impl ZLookup {
    pub fn new(config: ZClientConfig) -> Self {
        Self { config, conn: None }
    }

    pub fn connected(&self) -> bool {
        self.conn.is_some()
    }

    fn mark_disconnected(&mut self, reason: &str) {
        if self.conn.take().is_some() {
            log::warn!("zlookup socket to {} closed: {reason}", self.config.endpoint);
        }
    }

    /// One reconnect attempt, driven by `nht-scan`'s reconnect timer
    /// (spec.md §4.8's `zlookup.t_connect`). A no-op if already connected.
    pub async fn reconnect(&mut self) -> bool {
        if self.connected() {
            return true;
        }
        let attempt = match &self.config.endpoint {
            #[cfg(unix)]
            Endpoint::Unix(path) => UnixStream::connect(path).await.map(Conn::Unix),
            Endpoint::Tcp(addr) => TcpStream::connect(addr)
                .await
                .and_then(|s| {
                    s.set_nodelay(true)?;
                    Ok(s)
                })
                .map(Conn::Tcp),
        };
        match attempt {
            Ok(conn) => {
                log::debug!("zlookup connected to {}", self.config.endpoint);
                self.conn = Some(conn);
                true
            }
            Err(err) => {
                log::debug!("zlookup reconnect to {} failed: {err}", self.config.endpoint);
                false
            }
        }
    }

    async fn send<T: nht_wire::WireCodec>(
        &mut self,
        command: Command,
        body: &T,
    ) -> Result<(), ZClientError> {
        let conn = self.conn.as_mut().ok_or(ZClientError::NotConnected)?;
        let framed = encode_framed(command.into(), body)?;
        conn.write_all(&framed).await.map_err(ZClientError::from)
    }

    async fn recv_frame(&mut self) -> Result<(u16, Vec<u8>), ZClientError> {
        let conn = self.conn.as_mut().ok_or(ZClientError::NotConnected)?;
        let mut header_buf = [0u8; HEADER_SIZE];
        conn.read_exact(&mut header_buf).await?;
        let (_, header) = MessageHeader::decode(&header_buf)?;
        let body_len = (header.total_length as usize)
            .checked_sub(HEADER_SIZE)
            .ok_or_else(|| {
                nht_wire::WireError::Malformed(format!(
                    "total_length {} shorter than header",
                    header.total_length
                ))
            })?;
        let mut body = vec![0u8; body_len];
        if body_len > 0 {
            conn.read_exact(&mut body).await?;
        }
        Ok((header.command, body))
    }

    async fn roundtrip<Q: nht_wire::WireCodec, R: nht_wire::WireCodec>(
        &mut self,
        command: Command,
        query: &Q,
    ) -> Result<R, ZClientError> {
        self.send(command, query).await?;
        let (got_command, body) = self.recv_frame().await?;
        if got_command != command.into() {
            return Err(ZClientError::UnexpectedCommand(got_command));
        }
        Ok(decode_body(&body)?)
    }

    /// spec.md §4.2 IPv4 nexthop lookup. `None` covers both "socket down"
    /// and "daemon reported zero nexthops" — callers don't need to tell
    /// them apart, per spec.md §4.5.
    pub async fn resolve_v4(&mut self, addr: Ipv4Addr) -> Option<Resolution> {
        if !self.connected() {
            return None;
        }
        let query = Ipv4LookupQuery { addr };
        let resp: Ipv4LookupResponse = match self
            .roundtrip(Command::Ipv4NexthopLookup, &query)
            .await
        {
            Ok(r) => r,
            Err(err) => {
                self.mark_disconnected(&err.to_string());
                return None;
            }
        };
        if resp.nexthops.is_empty() {
            return None;
        }
        Some(Resolution {
            metric: resp.metric,
            nexthops: resp.nexthops,
        })
    }

    /// spec.md §4.2 IPv6 nexthop lookup, the same shape as `resolve_v4`.
    pub async fn resolve_v6(&mut self, addr: Ipv6Addr) -> Option<Resolution> {
        if !self.connected() {
            return None;
        }
        let query = Ipv6LookupQuery { addr };
        let resp: Ipv6LookupResponse = match self
            .roundtrip(Command::Ipv6NexthopLookup, &query)
            .await
        {
            Ok(r) => r,
            Err(err) => {
                self.mark_disconnected(&err.to_string());
                return None;
            }
        };
        if resp.nexthops.is_empty() {
            return None;
        }
        Some(Resolution {
            metric: resp.metric,
            nexthops: resp.nexthops,
        })
    }

    /// spec.md §4.7 import-check: asks whether a statically configured
    /// route is still resolvable, returning the optimistic default when
    /// the oracle is unreachable so an outage never withdraws a route.
    pub async fn import_check_v4(&mut self, prefixlen: u8, addr: Ipv4Addr) -> ImportCheck {
        if !self.connected() {
            return ImportCheck::oracle_unavailable();
        }
        let query = ImportLookupQuery { prefixlen, addr };
        let resp: ImportLookupResponse = match self
            .roundtrip(Command::Ipv4ImportLookup, &query)
            .await
        {
            Ok(r) => r,
            Err(err) => {
                self.mark_disconnected(&err.to_string());
                return ImportCheck::oracle_unavailable();
            }
        };
        // Open question in spec.md §4.7: a non-gate first nexthop (e.g. an
        // interface-only route) still counts as active, just with no gate
        // to report — see DESIGN.md.
        let nexthop = match resp.nexthop {
            Some(NextHop::Ipv4Gate(gate)) => gate,
            _ => Ipv4Addr::UNSPECIFIED,
        };
        ImportCheck {
            active: resp.nexthop.is_some(),
            metric: resp.metric,
            nexthop,
        }
    }

    /// spec.md §4.6 recursive-gate desync verify: sends every pre-built
    /// batch and drains responses until `more_follows` is false. Any I/O
    /// failure aborts the whole exchange and reports no desync records —
    /// "treats all prefixes as not desynced" per spec.md §7 — rather than
    /// forcing a refresh based on a partial read.
    pub async fn verify_rgates_v4(&mut self, batches: &[RGateVerifyQuery]) -> Vec<VerifyDesyncRecord> {
        if !self.connected() || batches.is_empty() {
            return Vec::new();
        }
        for batch in batches {
            if let Err(err) = self.send(Command::Ipv4RGateVerify, batch).await {
                self.mark_disconnected(&err.to_string());
                return Vec::new();
            }
        }
        let mut desynced = Vec::new();
        loop {
            let (command, body) = match self.recv_frame().await {
                Ok(v) => v,
                Err(err) => {
                    self.mark_disconnected(&err.to_string());
                    return Vec::new();
                }
            };
            if command != Command::Ipv4RGateVerify.into() {
                self.mark_disconnected("unexpected command in rgate-verify response stream");
                return Vec::new();
            }
            let resp: RGateVerifyResponse = match decode_body(&body) {
                Ok(r) => r,
                Err(err) => {
                    self.mark_disconnected(&err.to_string());
                    return Vec::new();
                }
            };
            desynced.extend(resp.records);
            if !resp.more_follows {
                break;
            }
        }
        desynced
    }
}
