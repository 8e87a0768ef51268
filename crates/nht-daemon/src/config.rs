//! Startup configuration for the scanner process: where the routing
//! daemon's lookup socket lives and how often the three timers fire
//! (spec.md §4.8). There is no file format here — a real BGP speaker reads
//! this from its own configuration store and constructs [`DaemonConfig`]
//! directly; the environment-variable fallback below only exists so the
//! binary in this workspace has something to run against standalone.

use nht_scan::config::ScanConfig;
use nht_zclient::{Endpoint, ZClientConfig};
use std::time::Duration;

const DEFAULT_RECONNECT_SECS: u64 = 5;

#[cfg(unix)]
const DEFAULT_ENDPOINT: &str = "/var/run/nht-zserv.sock";

pub struct DaemonConfig {
    pub zclient: ZClientConfig,
    pub scan: ScanConfig,
}

impl DaemonConfig {
    pub fn from_env() -> Self {
        let reconnect_interval = std::env::var("NHT_RECONNECT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_RECONNECT_SECS));

        let endpoint = std::env::var("NHT_ZSERV_ENDPOINT")
            .ok()
            .and_then(|v| parse_endpoint(&v))
            .unwrap_or_else(default_endpoint);

        Self {
            zclient: ZClientConfig { endpoint, reconnect_interval },
            scan: ScanConfig::new(),
        }
    }
}

#[cfg(unix)]
fn default_endpoint() -> Endpoint {
    Endpoint::Unix(DEFAULT_ENDPOINT.into())
}

#[cfg(not(unix))]
fn default_endpoint() -> Endpoint {
    Endpoint::Tcp("127.0.0.1:2601".parse().unwrap())
}

fn parse_endpoint(value: &str) -> Option<Endpoint> {
    #[cfg(unix)]
    if let Some(path) = value.strip_prefix("unix:") {
        return Some(Endpoint::Unix(path.into()));
    }
    value.strip_prefix("tcp:").and_then(|addr| addr.parse().ok()).map(Endpoint::Tcp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tcp_endpoint() {
        match parse_endpoint("tcp:127.0.0.1:2601") {
            Some(Endpoint::Tcp(addr)) => assert_eq!(addr.port(), 2601),
            other => panic!("unexpected parse result: {other:?}"),
        }
    }
}
