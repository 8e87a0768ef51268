//! Minimal `BgpCollaborator`/`RibView`/`PeerView`/`StaticRouteView`
//! implementations so `main` has something concrete to drive the scan and
//! import loops against. A real BGP speaker owns its RIB, peer table, and
//! static-route table already and would supply its own types behind these
//! traits instead of the empty stand-ins here.

use log::info;
use nht_common::{Afi, Safi};
use nht_scan::{BgpCollaborator, DampOutcome, PeerView, PrefixKey, RibView, RouteInfo, StaticRoute, StaticRouteView};
use std::collections::HashMap;

/// Tracks only what the scan loop itself needs back (the previous `VALID`
/// value) and logs everything else — enough to exercise every
/// `BgpCollaborator` call from a real scan/import pass.
#[derive(Debug, Default)]
pub struct StandaloneCollaborator {
    valid: HashMap<PrefixKey, bool>,
}

impl BgpCollaborator for StandaloneCollaborator {
    fn aggregate_increment(&mut self, prefix: PrefixKey) {
        info!("aggregate_increment {prefix}");
    }

    fn aggregate_decrement(&mut self, prefix: PrefixKey) {
        info!("aggregate_decrement {prefix}");
    }

    fn set_igp_changed(&mut self, prefix: PrefixKey, changed: bool) {
        if changed {
            info!("igp_changed {prefix}");
        }
    }

    fn set_valid(&mut self, prefix: PrefixKey, valid: bool) -> bool {
        self.valid.insert(prefix, valid).unwrap_or(false)
    }

    fn damp_scan(&mut self, _prefix: PrefixKey) -> DampOutcome {
        DampOutcome::Unchanged
    }

    fn process(&mut self, _prefix: PrefixKey) {}

    fn static_update(&mut self, prefix: PrefixKey) {
        info!("static_update {prefix}");
    }

    fn static_withdraw(&mut self, prefix: PrefixKey) {
        info!("static_withdraw {prefix}");
    }
}

/// No BGP routes until the embedding speaker supplies its own `RibView`.
pub struct EmptyRib;

impl RibView for EmptyRib {
    fn walk(&self, _afi: Afi) -> Vec<(PrefixKey, RouteInfo)> {
        Vec::new()
    }
}

/// No established peers until the embedding speaker supplies its own
/// `PeerView`.
pub struct EmptyPeers;

impl PeerView for EmptyPeers {
    fn established_peers(&self) -> Vec<u32> {
        Vec::new()
    }

    fn check_max_prefix_overflow(&mut self, _peer: u32, _afi: Afi, _safi: Safi) {}
}

/// No statically configured routes until the embedding speaker supplies
/// its own `StaticRouteView`.
pub struct EmptyStaticRoutes;

impl StaticRouteView for EmptyStaticRoutes {
    fn static_routes(&self) -> Vec<StaticRoute> {
        Vec::new()
    }
}
