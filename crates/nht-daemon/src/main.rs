//! Process entry point: wires `nht-zclient`'s oracle, `nht-iface`'s
//! connected-address feed, and `nht-scan`'s scan/import engines onto a
//! single-threaded-cooperative event loop (spec.md §5) built on `tokio`.
//!
//! The RIB, peer table, and static-route table this binary drives the
//! scanner against are the real BGP speaker's (non-goal, see spec.md
//! NON-GOALS), so `collaborator` below stands in for them with the
//! minimum needed to exercise the loop end to end; an embedding speaker
//! replaces `StandaloneCollaborator` with its own RIB/decision-process
//! types behind the same traits.

mod collaborator;
mod config;
mod show;

use crate::config::DaemonConfig;
#[cfg(any(target_os = "linux", target_os = "windows"))]
use anyhow::Context;
use collaborator::StandaloneCollaborator;
use log::{info, warn, LevelFilter};
use nht_common::Afi;
#[cfg(any(target_os = "linux", target_os = "windows"))]
use nht_common::Prefix;
#[cfg(any(target_os = "linux", target_os = "windows"))]
use nht_iface::ConnectedAddressSource;
use nht_scan::{Importer, Scanner, Timers};
use nht_zclient::ZLookup;
use simple_logger::SimpleLogger;
#[cfg(any(target_os = "linux", target_os = "windows"))]
use std::collections::HashSet;
use std::process::exit;

#[cfg(target_os = "linux")]
type PlatformAddressSource = nht_iface::linux::LinuxConnectedAddressSource;
#[cfg(target_os = "windows")]
type PlatformAddressSource = nht_iface::windows_sys::WindowsConnectedAddressSource;

#[tokio::main]
async fn main() {
    if let Err(error) = SimpleLogger::new().with_level(LevelFilter::Info).init() {
        println!("Unable to initialize logging => {error}");
        exit(-1);
    }

    if let Err(error) = run().await {
        log::error!("fatal error => {error:#}");
        exit(-1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = DaemonConfig::from_env();
    info!("starting nexthop scanner, endpoint={}", config.zclient.endpoint);

    let mut zlookup = ZLookup::new(config.zclient.clone());
    if !zlookup.reconnect().await {
        warn!("initial connect to zlookup endpoint failed, will retry on the reconnect timer");
    }

    #[cfg(any(target_os = "linux", target_os = "windows"))]
    let iface_source = PlatformAddressSource::new().context("enumerate connected interface addresses")?;

    let mut scanner = Scanner::new();
    let importer = Importer::new();
    let mut timers = Timers::new(
        config.scan.scan_interval(),
        config.scan.import_interval(),
        config.zclient.reconnect_interval,
    );
    let mut collaborator = StandaloneCollaborator::default();
    #[cfg(any(target_os = "linux", target_os = "windows"))]
    let mut seen_addresses: HashSet<Prefix> = HashSet::new();

    loop {
        let (scan_tick, import_tick, reconnect_tick) = timers.split_mut();
        tokio::select! {
            _ = scan_tick.tick() => {
                #[cfg(any(target_os = "linux", target_os = "windows"))]
                refresh_connected_addresses(&mut scanner, &iface_source, &mut seen_addresses).await;

                for afi in [Afi::Ipv4, Afi::Ipv6] {
                    let rib = collaborator::EmptyRib;
                    let mut peers = collaborator::EmptyPeers;
                    let stats = scanner.scan(afi, &rib, &mut peers, &mut collaborator, &mut zlookup).await;
                    info!("{afi:?} scan complete: {} processed, {} desynced", stats.processed, stats.desynced);
                }
            }
            _ = import_tick.tick() => {
                let routes = collaborator::EmptyStaticRoutes;
                importer.import(&routes, &mut collaborator, &mut zlookup).await;
            }
            _ = reconnect_tick.tick() => {
                if !zlookup.connected() && zlookup.reconnect().await {
                    log::debug!("zlookup reconnected");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutdown signal received, draining timers and releasing caches");
                break;
            }
        }
    }

    drop(timers);
    scanner.finish();
    Ok(())
}

#[cfg(any(target_os = "linux", target_os = "windows"))]
async fn refresh_connected_addresses<S: ConnectedAddressSource>(
    scanner: &mut Scanner,
    source: &S,
    seen: &mut HashSet<Prefix>,
) {
    let addresses = match source.all().await {
        Ok(addresses) => addresses,
        Err(error) => {
            warn!("failed to enumerate connected addresses: {error}");
            return;
        }
    };

    let fresh: HashSet<Prefix> = addresses.iter().map(|address| address.prefix).collect();

    for prefix in fresh.difference(seen) {
        let afi = match prefix.address {
            std::net::IpAddr::V4(_) => Afi::Ipv4,
            std::net::IpAddr::V6(_) => Afi::Ipv6,
        };
        scanner.conn_table_mut(afi).connected_add(*prefix);
    }
    for prefix in seen.difference(&fresh) {
        let afi = match prefix.address {
            std::net::IpAddr::V4(_) => Afi::Ipv4,
            std::net::IpAddr::V6(_) => Afi::Ipv6,
        };
        scanner.conn_table_mut(afi).connected_delete(*prefix);
    }

    *seen = fresh;
}
