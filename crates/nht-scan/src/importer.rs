//! The import engine (spec.md §4.7): the periodic loop that re-checks
//! IGP presence for statically configured BGP routes and drives
//! `static_update`/`static_withdraw` through the collaborator.

use crate::collaborator::{BgpCollaborator, PrefixKey};
use nht_common::{Afi, Safi};
use nht_zclient::NexthopOracle;
use std::net::Ipv4Addr;

/// One statically configured BGP route's current resolution state
/// (`BgpStaticRef` in spec.md §3) — owned by the BGP layer; the importer
/// only ever reads and overwrites `valid`/`metric`/`nexthop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticRouteState {
    pub valid: bool,
    pub metric: u32,
    pub nexthop: Ipv4Addr,
    pub has_route_map: bool,
}

/// A statically configured route as the importer sees it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticRoute {
    pub prefix: PrefixKey,
    pub afi: Afi,
    pub safi: Safi,
    pub backdoor: bool,
    pub import_check: bool,
    pub state: StaticRouteState,
}

/// Enumerates the statically configured routes the importer should
/// consider this cycle — the BGP layer's static-route table, external to
/// this workspace.
pub trait StaticRouteView {
    fn static_routes(&self) -> Vec<StaticRoute>;
}

#[derive(Debug, Default)]
pub struct Importer;

impl Importer {
    pub fn new() -> Self {
        Self
    }

    /// spec.md §4.7: fires once per import interval. `apply` is called
    /// with each route's freshly resolved state so the caller (owner of
    /// the static-route table) can persist it.
    pub async fn import<S, C, O>(&self, routes: &S, collaborator: &mut C, oracle: &mut O)
    where
        S: StaticRouteView,
        C: BgpCollaborator,
        O: NexthopOracle,
    {
        for route in routes.static_routes() {
            if route.backdoor || route.safi == Safi::MplsVpn {
                continue;
            }

            let previous = route.state;
            let fresh = if route.import_check && route.afi == Afi::Ipv4 && route.safi == Safi::Unicast {
                let addr = match route.prefix.address {
                    std::net::IpAddr::V4(addr) => addr,
                    std::net::IpAddr::V6(_) => continue,
                };
                let check = oracle.import_check_v4(route.prefix.mask, addr).await;
                StaticRouteState {
                    valid: check.active,
                    metric: check.metric,
                    nexthop: check.nexthop,
                    has_route_map: previous.has_route_map,
                }
            } else {
                StaticRouteState {
                    valid: true,
                    metric: 0,
                    nexthop: Ipv4Addr::UNSPECIFIED,
                    has_route_map: previous.has_route_map,
                }
            };

            if fresh.valid != previous.valid {
                if fresh.valid {
                    collaborator.static_update(route.prefix);
                } else {
                    collaborator.static_withdraw(route.prefix);
                }
            } else if fresh.valid
                && (fresh.metric != previous.metric
                    || fresh.nexthop != previous.nexthop
                    || fresh.has_route_map != previous.has_route_map)
            {
                collaborator.static_update(route.prefix);
            }
        }
    }
}
