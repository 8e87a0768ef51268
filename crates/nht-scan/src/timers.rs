//! Scheduler glue (spec.md §4.8): the scan timer, the import timer, and the
//! lookup-socket reconnect timer, as `tokio::time::Interval`s owned by one
//! value instead of the three bare handles spec.md describes — dropping
//! `Timers` on shutdown cancels all three at once.

use nht_zclient::ZLookup;
use std::time::Duration;
use tokio::time::{interval, Interval};

pub struct Timers {
    scan: Interval,
    import: Interval,
    reconnect: Interval,
}

impl Timers {
    pub fn new(scan_interval: Duration, import_interval: Duration, reconnect_interval: Duration) -> Self {
        Self {
            scan: interval(scan_interval),
            import: interval(import_interval),
            reconnect: interval(reconnect_interval),
        }
    }

    /// Disjoint mutable access to all three intervals at once — needed to
    /// drive them from a single `tokio::select!` (spec.md §5's "one event
    /// loop dispatches timer callbacks"), since `select!` must hold all
    /// branch futures concurrently and three separate `&mut self` calls on
    /// the same `Timers` would alias.
    pub fn split_mut(&mut self) -> (&mut Interval, &mut Interval, &mut Interval) {
        (&mut self.scan, &mut self.import, &mut self.reconnect)
    }

    async fn tick_reconnect(&mut self) {
        self.reconnect.tick().await;
    }

    /// Drives one reconnect attempt against `zlookup` when its timer fires
    /// and the socket is currently down; a no-op while already connected.
    pub async fn reconnect(&mut self, zlookup: &mut ZLookup) -> bool {
        self.tick_reconnect().await;
        if zlookup.connected() {
            return true;
        }
        zlookup.reconnect().await
    }
}
