//! The trait boundary between this oracle and the surrounding BGP speaker
//! (spec.md §6): RIB storage, the decision process, aggregation, and
//! damping are all out of scope, so `Scanner`/`Importer` only ever touch
//! them through these three traits. Generic code against `BgpCollaborator`
//! is what makes the eight testable properties in spec.md §8 checkable
//! without a live BGP speaker.

use nht_common::{Afi, Prefix, Safi};
use std::net::IpAddr;

/// A BGP destination prefix, keyed exactly like every other prefix in this
/// workspace.
pub type PrefixKey = Prefix;

/// Opaque identifier for an established BGP peer, as `PeerView` sees it.
pub type PeerId = u32;

/// The subset of a BGP route-info entry (`bi` in spec.md §4.5) the scan
/// loop needs to decide how to resolve its nexthop. Read-only: flag writes
/// go back through [`BgpCollaborator`], not through this struct.
#[derive(Debug, Clone, Copy)]
pub struct RouteInfo {
    pub nexthop: IpAddr,
    /// True when the advertising peer is single-hop EBGP (TTL = 1),
    /// enabling the on-link shortcut (spec.md §4.5).
    pub single_hop_ebgp: bool,
    /// True when this route carries active damping state; gates the
    /// `damp_scan` call.
    pub has_damping_state: bool,
    /// IPv6 MP_REACH_NLRI nexthop shape — irrelevant for IPv4 routes.
    pub nexthop_shape: NexthopShape,
}

/// The trivial-on-link cases spec.md §4.5 calls out for IPv6: a link-local
/// nexthop, or the global-plus-link-local pair (wire length 32), are valid
/// without a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NexthopShape {
    #[default]
    Normal,
    Ipv6LinkLocal,
    Ipv6GlobalWithLinkLocalPair,
}

/// Outcome of consulting route-flap damping for one prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DampOutcome {
    Suppressed,
    Reactivated,
    Unchanged,
}

/// Yields the BGP unicast RIB for one address family, prefix-sorted
/// (spec.md §5's ordering guarantee). A real speaker backs this with its
/// RIB trie; tests back it with a fixed `Vec`.
pub trait RibView {
    fn walk(&self, afi: Afi) -> Vec<(PrefixKey, RouteInfo)>;
}

/// Peer bookkeeping the scan loop's housekeeping step touches (spec.md
/// §4.5 step 2) — maximum-prefix overflow, scoped per `(afi, safi)`.
pub trait PeerView {
    fn established_peers(&self) -> Vec<PeerId>;
    fn check_max_prefix_overflow(&mut self, peer: PeerId, afi: Afi, safi: Safi);
}

/// Everything the scan/import loops ask of the surrounding BGP layer
/// (spec.md §6 "calls the core issues"). `set_valid` returns the *previous*
/// flag value so the caller can decide whether an aggregate call is due
/// without keeping its own shadow copy of the flag.
pub trait BgpCollaborator {
    fn aggregate_increment(&mut self, prefix: PrefixKey);
    fn aggregate_decrement(&mut self, prefix: PrefixKey);
    fn set_igp_changed(&mut self, prefix: PrefixKey, changed: bool);
    fn set_valid(&mut self, prefix: PrefixKey, valid: bool) -> bool;
    fn damp_scan(&mut self, prefix: PrefixKey) -> DampOutcome;
    fn process(&mut self, prefix: PrefixKey);
    fn static_update(&mut self, prefix: PrefixKey);
    fn static_withdraw(&mut self, prefix: PrefixKey);
}
