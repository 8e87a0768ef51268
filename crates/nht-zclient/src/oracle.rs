//! The async trait `Scanner`/`Importer` (in `nht-scan`) are generic over,
//! so their unit tests can drive a recording mock instead of a real
//! routing-daemon socket while production code still gets the real
//! [`ZLookup`].

use crate::client::{ImportCheck, Resolution, ZLookup};
use nht_wire::message::{RGateVerifyQuery, VerifyDesyncRecord};
use std::net::{Ipv4Addr, Ipv6Addr};

#[async_trait::async_trait]
pub trait NexthopOracle {
    async fn resolve_v4(&mut self, addr: Ipv4Addr) -> Option<Resolution>;
    async fn resolve_v6(&mut self, addr: Ipv6Addr) -> Option<Resolution>;
    async fn import_check_v4(&mut self, prefixlen: u8, addr: Ipv4Addr) -> ImportCheck;
    async fn verify_rgates_v4(&mut self, batches: &[RGateVerifyQuery]) -> Vec<VerifyDesyncRecord>;
}

#[async_trait::async_trait]
impl NexthopOracle for ZLookup {
    async fn resolve_v4(&mut self, addr: Ipv4Addr) -> Option<Resolution> {
        ZLookup::resolve_v4(self, addr).await
    }

    async fn resolve_v6(&mut self, addr: Ipv6Addr) -> Option<Resolution> {
        ZLookup::resolve_v6(self, addr).await
    }

    async fn import_check_v4(&mut self, prefixlen: u8, addr: Ipv4Addr) -> ImportCheck {
        ZLookup::import_check_v4(self, prefixlen, addr).await
    }

    async fn verify_rgates_v4(&mut self, batches: &[RGateVerifyQuery]) -> Vec<VerifyDesyncRecord> {
        ZLookup::verify_rgates_v4(self, batches).await
    }
}
