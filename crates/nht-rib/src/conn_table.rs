//! The connected-prefix table (spec.md §3, §4.3): a refcounted
//! longest-prefix-match set of locally connected networks, one per address
//! family. Feeds the EBGP single-hop on-link shortcut and the
//! `multiaccess_check` collaborator call.

use crate::trie::LpmTrie;
use nht_common::Prefix;
use std::net::IpAddr;
use std::num::NonZeroU32;

#[derive(Debug, Clone, Copy)]
pub struct ConnectedRef {
    refcnt: NonZeroU32,
}

impl ConnectedRef {
    pub fn refcnt(&self) -> u32 {
        self.refcnt.get()
    }
}

/// Per-address-family table of connected prefixes. Construct one instance
/// per AFI, as spec.md §3 requires.
#[derive(Debug, Default)]
pub struct ConnTable {
    trie: LpmTrie<ConnectedRef>,
}

impl ConnTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trie.is_empty()
    }

    /// Adds a reference for `address/mask`, after truncating to the network
    /// prefix. Rejects loopback, link-local, unspecified and default
    /// prefixes (spec.md §4.3) by returning `false` without mutating the
    /// table.
    pub fn connected_add(&mut self, prefix: Prefix) -> bool {
        let network = prefix.apply_mask();
        if !network.is_connectable() {
            log::debug!("rejecting non-connectable prefix {network}");
            return false;
        }
        match self.trie.get_mut(&network) {
            Some(existing) => {
                existing.refcnt = existing.refcnt.checked_add(1).unwrap_or(existing.refcnt);
            }
            None => {
                self.trie.insert(
                    network,
                    ConnectedRef {
                        refcnt: NonZeroU32::new(1).unwrap(),
                    },
                );
            }
        }
        true
    }

    /// Decrements the reference for `address/mask`; removes the entry once
    /// the refcount reaches zero. Returns `false` if no such entry exists.
    pub fn connected_delete(&mut self, prefix: Prefix) -> bool {
        let network = prefix.apply_mask();
        let Some(existing) = self.trie.get_mut(&network) else {
            log::warn!("connected_delete for untracked prefix {network}");
            return false;
        };
        match NonZeroU32::new(existing.refcnt.get() - 1) {
            Some(next) => existing.refcnt = next,
            None => {
                self.trie.remove(&network);
            }
        }
        true
    }

    /// True iff some connected entry covers `addr` — the EBGP single-hop
    /// on-link shortcut test (spec.md §4.3, §4.5).
    pub fn onlink(&self, addr: IpAddr) -> bool {
        self.trie.contains_covering(addr)
    }

    /// True iff `a` and `b` longest-prefix-match to the same connected
    /// entry — backs the `multiaccess_check_v4` collaborator call
    /// (spec.md §6).
    pub fn same_network(&self, a: IpAddr, b: IpAddr) -> bool {
        match (self.trie.lookup(a), self.trie.lookup(b)) {
            (Some((pa, _)), Some((pb, _))) => pa == pb,
            _ => false,
        }
    }

    pub fn refcount(&self, prefix: &Prefix) -> Option<u32> {
        self.trie.get(&prefix.apply_mask()).map(|r| r.refcnt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refcounting_round_trip() {
        let mut table = ConnTable::new();
        let prefix: Prefix = "192.0.2.0/24".parse().unwrap();
        for _ in 0..3 {
            assert!(table.connected_add(prefix));
        }
        assert_eq!(table.refcount(&prefix), Some(3));
        for _ in 0..3 {
            assert!(table.connected_delete(prefix));
        }
        assert!(table.is_empty());
    }

    #[test]
    fn rejects_special_prefixes() {
        let mut table = ConnTable::new();
        assert!(!table.connected_add("127.0.0.1/32".parse().unwrap()));
        assert!(!table.connected_add("169.254.1.1/32".parse().unwrap()));
        assert!(!table.connected_add("0.0.0.0/0".parse().unwrap()));
        assert!(table.is_empty());
    }

    #[test]
    fn onlink_uses_longest_prefix_match() {
        let mut table = ConnTable::new();
        table.connected_add("192.0.2.0/24".parse().unwrap());
        assert!(table.onlink("192.0.2.1".parse().unwrap()));
        assert!(!table.onlink("198.51.100.1".parse().unwrap()));
    }

    #[test]
    fn same_network_requires_identical_entry() {
        let mut table = ConnTable::new();
        table.connected_add("192.0.2.0/24".parse().unwrap());
        table.connected_add("198.51.100.0/24".parse().unwrap());
        assert!(table.same_network("192.0.2.1".parse().unwrap(), "192.0.2.2".parse().unwrap()));
        assert!(!table.same_network(
            "192.0.2.1".parse().unwrap(),
            "198.51.100.1".parse().unwrap()
        ));
    }
}
