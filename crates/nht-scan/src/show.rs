//! `show ip bgp scan` / `show ip bgp scan detail` (spec.md §6): a
//! human-readable dump of scan state. The vty/CLI framework that would
//! call this is external; these are the plain functions it would call
//! into, returning the text it would print.

use crate::config::ScanConfig;
use crate::scanner::Scanner;
use nht_common::Afi;
use std::fmt::Write as _;

/// Summary form: `show ip bgp scan`.
pub fn show_summary(config: &ScanConfig, scanner: &Scanner) -> String {
    let mut out = String::new();
    writeln!(out, "BGP scan is running").unwrap();
    writeln!(out, "Scan interval is {} seconds", config.scan_interval().as_secs()).unwrap();
    for afi in [Afi::Ipv4, Afi::Ipv6] {
        writeln!(
            out,
            "{afi:?}: {} connected prefixes, {} active nexthop cache entries",
            scanner.conn_table(afi).len(),
            scanner.bnct(afi).active_len(),
        )
        .unwrap();
    }
    out
}

/// Detail form: `show ip bgp scan detail`, adding each active cache
/// entry's validity, metric, and nexthop list.
pub fn show_detail(config: &ScanConfig, scanner: &Scanner) -> String {
    let mut out = show_summary(config, scanner);
    for afi in [Afi::Ipv4, Afi::Ipv6] {
        writeln!(out, "{afi:?} nexthop cache:").unwrap();
        for (nexthop, entry) in scanner.bnct(afi).active_entries() {
            writeln!(
                out,
                "  {nexthop} valid={} metric={} nexthops={:?}",
                entry.valid, entry.metric, entry.nexthops
            )
            .unwrap();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_reports_interval_and_counts() {
        let config = ScanConfig::new();
        let scanner = Scanner::new();
        let text = show_summary(&config, &scanner);
        assert!(text.contains("60 seconds"));
        assert!(text.contains("0 connected prefixes"));
    }
}
