//! Recording mocks for [`BgpCollaborator`], [`RibView`], [`PeerView`], and
//! [`NexthopOracle`], shared by `scanner`'s and `importer`'s unit tests so
//! the eight testable properties can be checked without a live BGP speaker
//! or routing daemon.

use crate::collaborator::{BgpCollaborator, DampOutcome, PeerId, PeerView, PrefixKey, RibView, RouteInfo};
use nht_common::{Afi, Safi};
use nht_wire::message::VerifyDesyncRecord;
use nht_zclient::{ImportCheck, NexthopOracle, Resolution};
use std::collections::{HashMap, VecDeque};
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Debug, Default)]
pub struct MockCollaborator {
    pub valid: HashMap<PrefixKey, bool>,
    pub igp_changed: HashMap<PrefixKey, bool>,
    pub increments: usize,
    pub decrements: usize,
    pub processed: Vec<PrefixKey>,
    pub damp_outcomes: HashMap<PrefixKey, DampOutcome>,
    pub static_updates: Vec<PrefixKey>,
    pub static_withdraws: Vec<PrefixKey>,
}

impl BgpCollaborator for MockCollaborator {
    fn aggregate_increment(&mut self, _prefix: PrefixKey) {
        self.increments += 1;
    }

    fn aggregate_decrement(&mut self, _prefix: PrefixKey) {
        self.decrements += 1;
    }

    fn set_igp_changed(&mut self, prefix: PrefixKey, changed: bool) {
        self.igp_changed.insert(prefix, changed);
    }

    fn set_valid(&mut self, prefix: PrefixKey, valid: bool) -> bool {
        let previous = self.valid.get(&prefix).copied().unwrap_or(false);
        self.valid.insert(prefix, valid);
        previous
    }

    fn damp_scan(&mut self, prefix: PrefixKey) -> DampOutcome {
        self.damp_outcomes.get(&prefix).copied().unwrap_or(DampOutcome::Unchanged)
    }

    fn process(&mut self, prefix: PrefixKey) {
        self.processed.push(prefix);
    }

    fn static_update(&mut self, prefix: PrefixKey) {
        self.static_updates.push(prefix);
    }

    fn static_withdraw(&mut self, prefix: PrefixKey) {
        self.static_withdraws.push(prefix);
    }
}

#[derive(Debug, Default)]
pub struct MockRib {
    routes: HashMap<Afi, Vec<(PrefixKey, RouteInfo)>>,
}

impl MockRib {
    pub fn with_routes(afi: Afi, routes: Vec<(PrefixKey, RouteInfo)>) -> Self {
        let mut map = HashMap::new();
        map.insert(afi, routes);
        Self { routes: map }
    }
}

impl RibView for MockRib {
    fn walk(&self, afi: Afi) -> Vec<(PrefixKey, RouteInfo)> {
        self.routes.get(&afi).cloned().unwrap_or_default()
    }
}

#[derive(Debug, Default)]
pub struct MockPeers {
    pub peers: Vec<PeerId>,
    pub overflow_checks: Vec<(PeerId, Afi, Safi)>,
}

impl PeerView for MockPeers {
    fn established_peers(&self) -> Vec<PeerId> {
        self.peers.clone()
    }

    fn check_max_prefix_overflow(&mut self, peer: PeerId, afi: Afi, safi: Safi) {
        self.overflow_checks.push((peer, afi, safi));
    }
}

/// A fake routing-daemon oracle: per-address canned `resolve_v4`/
/// `resolve_v6` answers, a queue of desync records for `verify_rgates_v4`,
/// and call counters for assertions like "the shortcut skipped the query".
#[derive(Debug, Default)]
pub struct MockOracle {
    resolve_v4_table: HashMap<Ipv4Addr, Option<Resolution>>,
    resolve_v6_table: HashMap<Ipv6Addr, Option<Resolution>>,
    import_check_table: HashMap<Ipv4Addr, ImportCheck>,
    desync_queue: VecDeque<VerifyDesyncRecord>,
    pub resolve_v4_calls: usize,
    pub resolve_v6_calls: usize,
    pub import_check_calls: usize,
    pub verify_rgates_calls: usize,
    /// When set, `verify_rgates_v4` returns empty, simulating a dead
    /// socket mid-batch (spec.md §7/§8 "oracle restart mid-cycle").
    pub socket_down: bool,
}

impl MockOracle {
    pub fn set_resolve_v4(&mut self, addr: Ipv4Addr, result: Option<Resolution>) {
        self.resolve_v4_table.insert(addr, result);
    }

    pub fn set_resolve_v6(&mut self, addr: Ipv6Addr, result: Option<Resolution>) {
        self.resolve_v6_table.insert(addr, result);
    }

    pub fn set_import_check_v4(&mut self, addr: Ipv4Addr, result: ImportCheck) {
        self.import_check_table.insert(addr, result);
    }

    pub fn queue_rgate_desync(&mut self, addr: Ipv4Addr) {
        self.desync_queue.push_back(VerifyDesyncRecord {
            prefix: addr,
            prefixlen: 32,
        });
    }
}

#[async_trait::async_trait]
impl NexthopOracle for MockOracle {
    async fn resolve_v4(&mut self, addr: Ipv4Addr) -> Option<Resolution> {
        self.resolve_v4_calls += 1;
        self.resolve_v4_table.get(&addr).cloned().flatten()
    }

    async fn resolve_v6(&mut self, addr: Ipv6Addr) -> Option<Resolution> {
        self.resolve_v6_calls += 1;
        self.resolve_v6_table.get(&addr).cloned().flatten()
    }

    async fn import_check_v4(&mut self, _prefixlen: u8, addr: Ipv4Addr) -> ImportCheck {
        self.import_check_calls += 1;
        self.import_check_table.get(&addr).copied().unwrap_or(ImportCheck {
            active: true,
            metric: 0,
            nexthop: Ipv4Addr::UNSPECIFIED,
        })
    }

    async fn verify_rgates_v4(
        &mut self,
        _batches: &[nht_wire::message::RGateVerifyQuery],
    ) -> Vec<VerifyDesyncRecord> {
        self.verify_rgates_calls += 1;
        if self.socket_down {
            return Vec::new();
        }
        self.desync_queue.drain(..).collect()
    }
}
