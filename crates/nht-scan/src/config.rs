//! The `bgp scan-time` / `no bgp scan-time` CLI surface from spec.md §6,
//! modelled as plain functions over a config value — the vty/CLI framework
//! itself stays an external collaborator, so there is nothing here to
//! parse commands, only to hold and validate the resulting state.

use std::time::Duration;

/// Lower/upper bound for `bgp scan-time`, spec.md §6: `<5-60>`.
pub const SCAN_INTERVAL_MIN_SECS: u64 = 5;
pub const SCAN_INTERVAL_MAX_SECS: u64 = 60;
/// `BGP_SCAN_INTERVAL_DEFAULT`, spec.md §2/§6.
pub const SCAN_INTERVAL_DEFAULT_SECS: u64 = 60;
/// Import interval has no CLI surface in spec.md; a sensible, separately
/// tunable default for the periodic static-route re-import loop.
pub const IMPORT_INTERVAL_DEFAULT_SECS: u64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanTimeOutOfRange {
    pub requested_secs: u64,
}

impl std::fmt::Display for ScanTimeOutOfRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "scan-time {} out of range {}-{}",
            self.requested_secs, SCAN_INTERVAL_MIN_SECS, SCAN_INTERVAL_MAX_SECS
        )
    }
}

impl std::error::Error for ScanTimeOutOfRange {}

/// Holds the currently configured scan/import intervals.
#[derive(Debug, Clone, Copy)]
pub struct ScanConfig {
    scan_interval: Duration,
    import_interval: Duration,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            scan_interval: Duration::from_secs(SCAN_INTERVAL_DEFAULT_SECS),
            import_interval: Duration::from_secs(IMPORT_INTERVAL_DEFAULT_SECS),
        }
    }
}

impl ScanConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_interval(&self) -> Duration {
        self.scan_interval
    }

    pub fn import_interval(&self) -> Duration {
        self.import_interval
    }

    pub fn set_import_interval(&mut self, interval: Duration) {
        self.import_interval = interval;
    }

    /// `bgp scan-time <5-60>`: out-of-range values are rejected here rather
    /// than by the (external) command framework, matching spec.md §7's
    /// "configuration errors rejected before reaching the core" — this is
    /// the core's half of that contract.
    pub fn set_scan_time(&mut self, secs: u64) -> Result<(), ScanTimeOutOfRange> {
        if !(SCAN_INTERVAL_MIN_SECS..=SCAN_INTERVAL_MAX_SECS).contains(&secs) {
            return Err(ScanTimeOutOfRange { requested_secs: secs });
        }
        self.scan_interval = Duration::from_secs(secs);
        Ok(())
    }

    /// `no bgp scan-time [<5-60>]`.
    pub fn reset_scan_time(&mut self) {
        self.scan_interval = Duration::from_secs(SCAN_INTERVAL_DEFAULT_SECS);
    }

    /// Emits `bgp scan-time <n>` only when it differs from the default,
    /// spec.md §6's config-writer rule.
    pub fn write_config(&self) -> Option<String> {
        let secs = self.scan_interval.as_secs();
        if secs == SCAN_INTERVAL_DEFAULT_SECS {
            None
        } else {
            Some(format!("bgp scan-time {secs}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_sixty_seconds_and_omitted_from_config_write() {
        let config = ScanConfig::new();
        assert_eq!(config.scan_interval(), Duration::from_secs(60));
        assert_eq!(config.write_config(), None);
    }

    #[test]
    fn set_scan_time_rejects_out_of_range() {
        let mut config = ScanConfig::new();
        assert!(config.set_scan_time(4).is_err());
        assert!(config.set_scan_time(61).is_err());
        assert!(config.set_scan_time(30).is_ok());
        assert_eq!(config.write_config().as_deref(), Some("bgp scan-time 30"));
    }

    #[test]
    fn reset_scan_time_restores_default() {
        let mut config = ScanConfig::new();
        config.set_scan_time(10).unwrap();
        config.reset_scan_time();
        assert_eq!(config.write_config(), None);
    }
}
