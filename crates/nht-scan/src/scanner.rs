//! The scan engine (spec.md §4.5): the periodic loop that rotates cache
//! generations, verifies recursive gates, walks the RIB, and drives
//! validity/aggregate/damping decisions through [`BgpCollaborator`].

use crate::collaborator::{BgpCollaborator, DampOutcome, NexthopShape, PeerView, PrefixKey, RibView, RouteInfo};
use nht_common::{Afi, Safi};
use nht_rib::{build_batches, Bnct, ConnTable, DesyncSet, NexthopCacheEntry};
use nht_zclient::{NexthopOracle, Resolution};
use std::net::IpAddr;

/// Aggregate counters for one `scan()` call, mostly useful for `show ip bgp
/// scan` and logging; not consulted by the algorithm itself.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanStats {
    pub processed: usize,
    pub desynced: usize,
    /// Net `aggregate_increment` minus `aggregate_decrement` calls caused
    /// by a validity flip (testable property 4).
    pub valid_transitions: i64,
}

/// Owns the per-AFI caches; one instance per BGP speaker process (spec.md
/// §9's "naturally singletons owned by the enclosing daemon").
#[derive(Debug, Default)]
pub struct Scanner {
    bnct_v4: Bnct,
    bnct_v6: Bnct,
    conn_table_v4: ConnTable,
    conn_table_v6: ConnTable,
}

impl Scanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bnct(&self, afi: Afi) -> &Bnct {
        match afi {
            Afi::Ipv4 => &self.bnct_v4,
            Afi::Ipv6 => &self.bnct_v6,
        }
    }

    fn bnct_mut(&mut self, afi: Afi) -> &mut Bnct {
        match afi {
            Afi::Ipv4 => &mut self.bnct_v4,
            Afi::Ipv6 => &mut self.bnct_v6,
        }
    }

    pub fn conn_table(&self, afi: Afi) -> &ConnTable {
        match afi {
            Afi::Ipv4 => &self.conn_table_v4,
            Afi::Ipv6 => &self.conn_table_v6,
        }
    }

    /// Mutable access for the interface-event pipeline (`nht-iface`'s
    /// `connected_add`/`connected_delete` feed, spec.md §3/§4.3).
    pub fn conn_table_mut(&mut self, afi: Afi) -> &mut ConnTable {
        match afi {
            Afi::Ipv4 => &mut self.conn_table_v4,
            Afi::Ipv6 => &mut self.conn_table_v6,
        }
    }

    /// Releases the `Bnct`/`ConnTable` pair for both address families on
    /// shutdown (spec.md §5), consuming `self` so nothing can scan again
    /// against a half-torn-down cache.
    pub fn finish(self) {
        self.bnct_v4.finish();
        self.bnct_v6.finish();
    }

    /// One scan pass for `afi`, spec.md §4.5 steps 1–6.
    pub async fn scan<R, P, C, O>(
        &mut self,
        afi: Afi,
        rib: &R,
        peers: &mut P,
        collaborator: &mut C,
        oracle: &mut O,
    ) -> ScanStats
    where
        R: RibView,
        P: PeerView,
        C: BgpCollaborator,
        O: NexthopOracle,
    {
        self.bnct_mut(afi).swap();

        for peer in peers.established_peers() {
            peers.check_max_prefix_overflow(peer, afi, Safi::Unicast);
        }

        let mut desync = DesyncSet::new();
        if afi == Afi::Ipv4 {
            let batches = build_batches(self.bnct(Afi::Ipv4));
            for record in oracle.verify_rgates_v4(&batches).await {
                desync.insert(record);
            }
        }

        let mut stats = ScanStats::default();
        for (prefix, route) in rib.walk(afi) {
            stats.processed += 1;

            if desync.contains(route.nexthop) {
                collaborator.set_igp_changed(prefix, true);
                collaborator.process(prefix);
                stats.desynced += 1;
                continue;
            }

            let (valid, changed) = self.resolve(afi, &route, oracle).await;

            collaborator.set_igp_changed(prefix, changed);
            let was_valid = collaborator.set_valid(prefix, valid);
            if was_valid != valid {
                stats.valid_transitions += if valid { 1 } else { -1 };
                if valid {
                    collaborator.aggregate_increment(prefix);
                } else {
                    collaborator.aggregate_decrement(prefix);
                }
            }

            if route.has_damping_state && collaborator.damp_scan(prefix) == DampOutcome::Reactivated {
                collaborator.aggregate_increment(prefix);
            }

            collaborator.process(prefix);
        }

        self.bnct_mut(afi).reset_previous();
        stats
    }

    /// Per-nexthop reachability decision (spec.md §4.5's on-link shortcut,
    /// IPv6 trivial-on-link cases, and cached resolution).
    async fn resolve<O: NexthopOracle>(
        &mut self,
        afi: Afi,
        route: &RouteInfo,
        oracle: &mut O,
    ) -> (bool, bool) {
        if route.single_hop_ebgp {
            return (self.conn_table(afi).onlink(route.nexthop), false);
        }
        if route.nexthop_shape != NexthopShape::Normal {
            return (true, false);
        }
        let entry = self.resolve_cached(afi, route.nexthop, oracle).await;
        (entry.valid, entry.changed)
    }

    /// spec.md §4.5 "cached resolution": active-table hit reuses the entry
    /// installed earlier this scan by another prefix sharing the nexthop;
    /// a miss queries the oracle and diffs the fresh result against the
    /// previous generation before installing it.
    async fn resolve_cached<O: NexthopOracle>(
        &mut self,
        afi: Afi,
        nexthop: IpAddr,
        oracle: &mut O,
    ) -> NexthopCacheEntry {
        if let Some(entry) = self.bnct(afi).lookup_active(nexthop) {
            return entry.clone();
        }

        let previous = self.bnct(afi).lookup_previous(nexthop).cloned();
        let resolution = match (afi, nexthop) {
            (Afi::Ipv4, IpAddr::V4(addr)) => oracle.resolve_v4(addr).await,
            (Afi::Ipv6, IpAddr::V6(addr)) => oracle.resolve_v6(addr).await,
            _ => None,
        };
        let fresh = match resolution {
            Some(Resolution { metric, nexthops }) => {
                NexthopCacheEntry::resolved(metric, nexthops).diff_against_previous(previous.as_ref())
            }
            None => NexthopCacheEntry::invalid(),
        };
        self.bnct_mut(afi).insert_active(nexthop, fresh.clone());
        fresh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockCollaborator, MockOracle, MockPeers, MockRib};
    use nht_wire::NextHop;

    fn route(nexthop: &str) -> RouteInfo {
        RouteInfo {
            nexthop: nexthop.parse().unwrap(),
            single_hop_ebgp: false,
            has_damping_state: false,
            nexthop_shape: NexthopShape::Normal,
        }
    }

    #[tokio::test]
    async fn fresh_scan_resolves_and_increments_aggregate() {
        let prefix: PrefixKey = "10.1.0.0/16".parse().unwrap();
        let rib = MockRib::with_routes(Afi::Ipv4, vec![(prefix, route("192.0.2.1"))]);
        let mut peers = MockPeers::default();
        let mut collaborator = MockCollaborator::default();
        let mut oracle = MockOracle::default();
        oracle.set_resolve_v4(
            "192.0.2.1".parse().unwrap(),
            Some(Resolution {
                metric: 20,
                nexthops: vec![NextHop::Ipv4Gate("192.0.2.254".parse().unwrap())],
            }),
        );

        let mut scanner = Scanner::new();
        let stats = scanner.scan(Afi::Ipv4, &rib, &mut peers, &mut collaborator, &mut oracle).await;

        assert_eq!(stats.processed, 1);
        assert_eq!(collaborator.increments, 1);
        assert_eq!(collaborator.decrements, 0);
        assert_eq!(collaborator.valid.get(&prefix), Some(&true));
        assert_eq!(scanner.bnct(Afi::Ipv4).active_len(), 1);
    }

    #[tokio::test]
    async fn onlink_shortcut_skips_oracle_query() {
        let prefix: PrefixKey = "10.2.0.0/16".parse().unwrap();
        let mut info = route("192.0.2.1");
        info.single_hop_ebgp = true;
        let rib = MockRib::with_routes(Afi::Ipv4, vec![(prefix, info)]);
        let mut peers = MockPeers::default();
        let mut collaborator = MockCollaborator::default();
        let mut oracle = MockOracle::default();

        let mut scanner = Scanner::new();
        scanner.conn_table_mut(Afi::Ipv4).connected_add("192.0.2.0/24".parse().unwrap());
        scanner.scan(Afi::Ipv4, &rib, &mut peers, &mut collaborator, &mut oracle).await;

        assert_eq!(collaborator.valid.get(&prefix), Some(&true));
        assert_eq!(collaborator.igp_changed.get(&prefix), Some(&false));
        assert_eq!(oracle.resolve_v4_calls, 0);
    }

    #[tokio::test]
    async fn disappearing_route_is_invalidated_and_decremented() {
        let prefix: PrefixKey = "10.1.0.0/16".parse().unwrap();
        let rib = MockRib::with_routes(Afi::Ipv4, vec![(prefix, route("192.0.2.1"))]);
        let mut peers = MockPeers::default();
        let mut collaborator = MockCollaborator::default();
        let mut oracle = MockOracle::default();
        let resolved = Resolution {
            metric: 20,
            nexthops: vec![NextHop::Ipv4Gate("192.0.2.254".parse().unwrap())],
        };
        oracle.set_resolve_v4("192.0.2.1".parse().unwrap(), Some(resolved));

        let mut scanner = Scanner::new();
        scanner.scan(Afi::Ipv4, &rib, &mut peers, &mut collaborator, &mut oracle).await;
        assert_eq!(collaborator.valid.get(&prefix), Some(&true));

        oracle.set_resolve_v4("192.0.2.1".parse().unwrap(), None);
        scanner.scan(Afi::Ipv4, &rib, &mut peers, &mut collaborator, &mut oracle).await;

        assert_eq!(collaborator.valid.get(&prefix), Some(&false));
        assert_eq!(collaborator.decrements, 1);
    }

    #[tokio::test]
    async fn identical_responses_across_two_scans_report_no_change() {
        let prefix: PrefixKey = "10.1.0.0/16".parse().unwrap();
        let rib = MockRib::with_routes(Afi::Ipv4, vec![(prefix, route("192.0.2.1"))]);
        let mut peers = MockPeers::default();
        let mut collaborator = MockCollaborator::default();
        let mut oracle = MockOracle::default();
        let resolved = Resolution {
            metric: 20,
            nexthops: vec![NextHop::Ipv4Gate("192.0.2.254".parse().unwrap())],
        };
        oracle.set_resolve_v4("192.0.2.1".parse().unwrap(), Some(resolved.clone()));

        let mut scanner = Scanner::new();
        scanner.scan(Afi::Ipv4, &rib, &mut peers, &mut collaborator, &mut oracle).await;
        oracle.set_resolve_v4("192.0.2.1".parse().unwrap(), Some(resolved));
        scanner.scan(Afi::Ipv4, &rib, &mut peers, &mut collaborator, &mut oracle).await;

        assert_eq!(collaborator.igp_changed.get(&prefix), Some(&false));
    }

    #[tokio::test]
    async fn desynced_prefix_sets_igp_changed_without_touching_valid() {
        let prefix: PrefixKey = "10.3.0.0/16".parse().unwrap();
        let rib = MockRib::with_routes(Afi::Ipv4, vec![(prefix, route("203.0.113.9"))]);
        let mut peers = MockPeers::default();
        let mut collaborator = MockCollaborator::default();
        let mut oracle = MockOracle::default();
        oracle.queue_rgate_desync("203.0.113.9".parse().unwrap());

        let mut scanner = Scanner::new();
        scanner.scan(Afi::Ipv4, &rib, &mut peers, &mut collaborator, &mut oracle).await;

        assert_eq!(collaborator.igp_changed.get(&prefix), Some(&true));
        assert!(!collaborator.valid.contains_key(&prefix));
        assert_eq!(collaborator.processed, vec![prefix]);
    }
}
