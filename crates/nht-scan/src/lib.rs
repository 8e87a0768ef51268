//! The scan/import engines and their timer glue (spec.md §4.5–§4.8): the
//! part of this workspace that is actually invoked by the enclosing BGP
//! speaker on a schedule, driving the caches in `nht-rib` against the
//! `nht-zclient` oracle and reporting decisions back through the
//! [`collaborator::BgpCollaborator`] trait boundary.

pub mod collaborator;
pub mod config;
pub mod importer;
pub mod scanner;
pub mod show;
pub mod timers;

#[cfg(test)]
mod testing;

pub use collaborator::{BgpCollaborator, DampOutcome, NexthopShape, PeerView, PrefixKey, RibView, RouteInfo};
pub use importer::{Importer, StaticRoute, StaticRouteState, StaticRouteView};
pub use scanner::{ScanStats, Scanner};
pub use timers::Timers;
